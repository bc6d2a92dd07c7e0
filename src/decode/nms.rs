use crate::{
    error::Error,
    point::Point,
    pose::{KeypointKind, Keypoints, Pose, NUM_KEYPOINTS},
};
use bitvec::prelude::*;
use num_traits::cast::ToPrimitive;

/// Whether `point` lies within the NMS radius of the `kind` keypoint of any accepted pose.
pub(crate) fn within_nms_radius(
    poses: &[Pose],
    point: Point,
    kind: KeypointKind,
    squared_nms_radius: f32,
) -> bool {
    poses
        .iter()
        .any(|pose| point.squared_distance(pose.keypoint(kind).point) <= squared_nms_radius)
}

/// Mark every keypoint of `keypoints` that overlaps its counterpart in `pose`.
fn find_overlapping_keypoints(
    keypoints: &Keypoints,
    pose: &Pose,
    squared_radius: f32,
    mask: &mut BitSlice,
) {
    keypoints
        .iter()
        .zip(&pose.keypoints)
        .enumerate()
        .for_each(|(i, (k1, k2))| {
            if k1.point.squared_distance(k2.point) <= squared_radius {
                mask.set(i, true);
            }
        })
}

/// Mean keypoint score of a decoded pose, where keypoints already claimed by an accepted
/// pose contribute nothing.
pub(crate) fn instance_score(
    poses: &[Pose],
    keypoints: &Keypoints,
    squared_nms_radius: f32,
) -> Result<f32, Error> {
    let mut occluded = bitvec![0; NUM_KEYPOINTS];
    for pose in poses {
        find_overlapping_keypoints(keypoints, pose, squared_nms_radius, &mut occluded);
    }

    let total = keypoints
        .iter()
        .zip(occluded.iter().by_vals())
        .filter_map(|(keypoint, occluded)| (!occluded).then(|| keypoint.score))
        .sum::<f32>();
    Ok(total / NUM_KEYPOINTS.to_f32().ok_or(Error::ConvertToF32)?)
}
