//! Multi-person pose decoding for PoseNet style models.
//!
//! A [`Decoder`] turns the four raw network outputs (keypoint heatmaps, short range
//! offsets, and forward and backward displacement fields) into a [`PoseSet`] of people
//! with per-keypoint scores and source image coordinates.

pub mod decode;
pub mod error;
pub mod geometry;
pub mod point;
pub mod pose;

pub use decode::{Decoder, DecoderConfig, GridCell, ModelOutputs, SkeletonGraph, TensorView};
pub use error::Error;
pub use geometry::{InputGeometry, Scale};
pub use point::Point;
pub use pose::{Keypoint, KeypointKind, Pose, PoseSet};
