use crate::{
    decode::{
        candidates::Candidate,
        skeleton::SkeletonGraph,
        tensor::{GridCell, ModelOutputs, TensorView},
    },
    error::Error,
    point::Point,
    pose::{KeypointKind, Keypoints, Pose},
};
use tracing::trace;

/// Input-space coordinate of keypoint `kind` at `cell`, refined by its offset vector.
fn refine(
    offsets: &TensorView<'_>,
    kind: KeypointKind,
    cell: GridCell,
    output_stride: f32,
) -> Result<Point, Error> {
    Ok(cell.to_image(output_stride)? + offsets.vector(kind.idx(), cell))
}

/// Where a candidate's keypoint lies in network input space.
pub(crate) fn seed_point(
    outputs: &ModelOutputs<'_>,
    candidate: &Candidate,
    output_stride: f32,
) -> Result<Point, Error> {
    refine(&outputs.offsets, candidate.kind, candidate.cell, output_stride)
}

/// Follow the displacement of edge `edge_index` from `source` and return the score and
/// refined position of the `target` keypoint at the cell it lands on.
fn traverse_to_target_keypoint(
    outputs: &ModelOutputs<'_>,
    displacements: &TensorView<'_>,
    edge_index: usize,
    source: Point,
    target: KeypointKind,
    output_stride: f32,
) -> Result<(f32, Point), Error> {
    let heatmaps = &outputs.heatmaps;
    let source_cell = heatmaps.cell_at(source, output_stride)?;
    let displaced = source + displacements.vector(edge_index, source_cell);
    let target_cell = heatmaps.cell_at(displaced, output_stride)?;
    let score = heatmaps.read(target.idx(), target_cell);
    let point = refine(&outputs.offsets, target, target_cell, output_stride)?;
    Ok((score, point))
}

fn propagate(
    outputs: &ModelOutputs<'_>,
    displacements: &TensorView<'_>,
    edge_index: usize,
    source: KeypointKind,
    target: KeypointKind,
    keypoints: &mut Keypoints,
    output_stride: f32,
) -> Result<(), Error> {
    let source = keypoints[source.idx()];
    let target = &mut keypoints[target.idx()];
    if source.is_decoded() && target.score == 0.0 {
        let (score, point) = traverse_to_target_keypoint(
            outputs,
            displacements,
            edge_index,
            source.point,
            target.kind,
            output_stride,
        )?;
        trace!(edge = edge_index, from = %source.kind, to = %target.kind, score);
        target.score = score;
        target.point = point;
    }
    Ok(())
}

/// Grow a full pose from a single seed keypoint.
///
/// The first pass walks the skeleton from the last edge to the first, stepping from
/// children to parents along the backward displacements. The second walks it in order,
/// stepping from parents to children along the forward displacements. A keypoint is only
/// filled while its score is still zero.
pub(crate) fn decode_pose(
    outputs: &ModelOutputs<'_>,
    skeleton: &SkeletonGraph,
    seed_kind: KeypointKind,
    seed_score: f32,
    seed_point: Point,
    output_stride: f32,
) -> Result<Pose, Error> {
    let mut pose = Pose::empty();
    let keypoints = &mut pose.keypoints;
    keypoints[seed_kind.idx()].score = seed_score;
    keypoints[seed_kind.idx()].point = seed_point;

    for edge in skeleton.edges().iter().rev() {
        propagate(
            outputs,
            &outputs.displacements_bwd,
            edge.index,
            edge.child,
            edge.parent,
            keypoints,
            output_stride,
        )?;
    }

    for edge in skeleton.edges() {
        propagate(
            outputs,
            &outputs.displacements_fwd,
            edge.index,
            edge.parent,
            edge.child,
            keypoints,
            output_stride,
        )?;
    }

    Ok(pose)
}
