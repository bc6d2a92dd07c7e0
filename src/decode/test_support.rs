use crate::{
    decode::tensor::{ModelOutputs, TensorView},
    pose::{constants::NUM_EDGES, KeypointKind, NUM_KEYPOINTS},
};

/// Owned `[channel][row][col]` buffers behind a [`ModelOutputs`].
#[derive(Debug, Clone)]
pub(crate) struct Buffers {
    pub(crate) height: usize,
    pub(crate) width: usize,
    pub(crate) heatmaps: Vec<f32>,
    pub(crate) offsets: Vec<f32>,
    pub(crate) fwd: Vec<f32>,
    pub(crate) bwd: Vec<f32>,
}

impl Buffers {
    pub(crate) fn zeros(height: usize, width: usize) -> Self {
        let cells = height * width;
        Self {
            height,
            width,
            heatmaps: vec![0.0; NUM_KEYPOINTS * cells],
            offsets: vec![0.0; 2 * NUM_KEYPOINTS * cells],
            fwd: vec![0.0; 2 * NUM_EDGES * cells],
            bwd: vec![0.0; 2 * NUM_EDGES * cells],
        }
    }

    pub(crate) fn index(&self, channel: usize, row: usize, col: usize) -> usize {
        (channel * self.height + row) * self.width + col
    }

    pub(crate) fn outputs(&self) -> ModelOutputs<'_> {
        let (h, w) = (self.height, self.width);
        ModelOutputs::new(
            TensorView::from_slice("heatmaps", &self.heatmaps, (NUM_KEYPOINTS, h, w)).unwrap(),
            TensorView::from_slice("offsets", &self.offsets, (2 * NUM_KEYPOINTS, h, w)).unwrap(),
            TensorView::from_slice("fwd", &self.fwd, (2 * NUM_EDGES, h, w)).unwrap(),
            TensorView::from_slice("bwd", &self.bwd, (2 * NUM_EDGES, h, w)).unwrap(),
        )
        .unwrap()
    }

    pub(crate) fn set_score(&mut self, kind: KeypointKind, row: usize, col: usize, score: f32) {
        let i = self.index(kind.idx(), row, col);
        self.heatmaps[i] = score;
    }

    /// Fill every channel except `kind` with `score`.
    pub(crate) fn fill_others(&mut self, kind: KeypointKind, score: f32) {
        let cells = self.height * self.width;
        self.heatmaps
            .chunks_mut(cells)
            .enumerate()
            .filter(|&(channel, _)| channel != kind.idx())
            .for_each(|(_, plane)| plane.fill(score));
    }

    pub(crate) fn set_offset(
        &mut self,
        kind: KeypointKind,
        row: usize,
        col: usize,
        dx: f32,
        dy: f32,
    ) {
        let (iy, ix) = (
            self.index(kind.idx(), row, col),
            self.index(kind.idx() + NUM_KEYPOINTS, row, col),
        );
        self.offsets[iy] = dy;
        self.offsets[ix] = dx;
    }

    pub(crate) fn set_fwd(&mut self, edge: usize, row: usize, col: usize, dx: f32, dy: f32) {
        let (iy, ix) = (self.index(edge, row, col), self.index(edge + NUM_EDGES, row, col));
        self.fwd[iy] = dy;
        self.fwd[ix] = dx;
    }

    pub(crate) fn set_bwd(&mut self, edge: usize, row: usize, col: usize, dx: f32, dy: f32) {
        let (iy, ix) = (self.index(edge, row, col), self.index(edge + NUM_EDGES, row, col));
        self.bwd[iy] = dy;
        self.bwd[ix] = dx;
    }
}
