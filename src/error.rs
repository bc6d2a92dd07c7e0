use crate::pose::KeypointKind;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to convert value to f32")]
    ConvertToF32,

    #[error("failed to convert usize value to keypoint kind: {0}")]
    ConvertUSizeToKeypointKind(usize),

    #[error("unknown keypoint name: {0:?}")]
    UnknownKeypointName(String),

    #[error("failed to construct NotNan from f32: {1}")]
    ConstructNotNan(#[source] ordered_float::FloatIsNan, f32),

    #[error("skeleton must have exactly {expected} edges, got {actual}")]
    SkeletonEdgeCount { expected: usize, actual: usize },

    #[error("skeleton edge {index} connects {kind:?} to itself")]
    SkeletonSelfLoop { index: usize, kind: KeypointKind },

    #[error("failed to construct {name} tensor view with shape {shape:?}")]
    ConstructTensorView {
        #[source]
        source: ndarray::ShapeError,
        name: &'static str,
        shape: (usize, usize, usize),
    },

    #[error("expected batch size 1 for {name} tensor, got {batch}")]
    BatchSize { name: &'static str, batch: usize },

    #[error("{name} tensor has an empty spatial grid")]
    EmptyGrid { name: &'static str },

    #[error("expected {expected} channels in {name} tensor, got {actual}")]
    ChannelCount {
        name: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("{name} tensor grid {actual:?} does not match heatmap grid {expected:?}")]
    GridMismatch {
        name: &'static str,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("invalid decoder configuration: {0}")]
    InvalidConfig(&'static str),

    #[error("image dimensions must be at least the output stride: got {width}x{height}, stride {stride}")]
    ImageTooSmall {
        width: usize,
        height: usize,
        stride: usize,
    },
}
