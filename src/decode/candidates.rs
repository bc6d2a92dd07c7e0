use crate::{
    decode::tensor::{GridCell, TensorView},
    error::Error,
    pose::KeypointKind,
};
use ordered_float::NotNan;
use std::cmp::Reverse;

/// A heatmap local maximum that may seed a pose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Candidate {
    pub(crate) kind: KeypointKind,
    pub(crate) score: NotNan<f32>,
    pub(crate) cell: GridCell,
}

/// Whether no cell within Chebyshev distance `radius` of `(row, col)` exceeds `score`.
/// Cells outside the grid count as zero and NaN neighbours never exceed.
fn score_is_max_in_local_window(
    heatmaps: &TensorView<'_>,
    channel: usize,
    score: f32,
    row: usize,
    col: usize,
    radius: usize,
) -> bool {
    let (height, width) = heatmaps.grid();
    let (row_end, col_end) = (row.saturating_add(radius), col.saturating_add(radius));
    let window_leaves_grid =
        row < radius || col < radius || row_end >= height || col_end >= width;
    if window_leaves_grid && score < 0.0 {
        return false;
    }
    let cols = col.saturating_sub(radius)..=col_end.min(width - 1);
    (row.saturating_sub(radius)..=row_end.min(height - 1)).all(|r| {
        cols.clone().all(|c| {
            let neighbor = heatmaps.read(channel, GridCell::new(r, c));
            neighbor <= score || neighbor.is_nan()
        })
    })
}

/// Every cell of every heatmap channel that is a local maximum within `radius` and
/// scores at least `score_threshold`, in channel, row, column order.
pub(crate) fn extract_local_maxima(
    heatmaps: &TensorView<'_>,
    score_threshold: f32,
    radius: usize,
) -> Result<Vec<Candidate>, Error> {
    let (height, width) = heatmaps.grid();
    let mut candidates = Vec::new();

    for channel in 0..heatmaps.channels() {
        let kind = KeypointKind::from_idx(channel)?;
        for row in 0..height {
            for col in 0..width {
                let cell = GridCell::new(row, col);
                let score = heatmaps.read(channel, cell);
                if score >= score_threshold
                    && score_is_max_in_local_window(heatmaps, channel, score, row, col, radius)
                {
                    candidates.push(Candidate {
                        kind,
                        score: NotNan::new(score).map_err(|e| Error::ConstructNotNan(e, score))?,
                        cell,
                    });
                }
            }
        }
    }
    Ok(candidates)
}

/// Sort by decreasing score. The sort is stable so equal scores keep discovery order.
pub(crate) fn rank(candidates: &mut [Candidate]) {
    candidates.sort_by_key(|candidate| Reverse(candidate.score));
}
