use crate::{
    error::Error,
    geometry::Scale,
    pose::{constants, PoseSet},
};
use candidates::{extract_local_maxima, rank};
use nms::{instance_score, within_nms_radius};
use propagate::{decode_pose, seed_point};
use tracing::{debug, trace};

pub use skeleton::{Edge, SkeletonGraph};
pub use tensor::{GridCell, ModelOutputs, TensorView};

mod candidates;
mod nms;
mod propagate;
mod skeleton;
mod tensor;
#[cfg(test)]
mod test_support;

/// Tunable parameters of the multi-pose decoder.
#[derive(Debug, Clone, Copy, PartialEq, structopt::StructOpt)]
pub struct DecoderConfig {
    /// Downsampling factor between the network input and its output grid.
    #[structopt(short, long, default_value = "16")]
    pub output_stride: u8,
    /// Stop once this many poses have been accepted.
    #[structopt(short = "d", long, default_value = "10")]
    pub max_pose_detections: usize,
    /// Minimum heatmap score for a local maximum to seed a pose.
    #[structopt(short, long, default_value = "0.5")]
    pub score_threshold: f32,
    /// Poses must score strictly above this to be accepted.
    #[structopt(short, long, default_value = "0.25")]
    pub min_pose_score: f32,
    /// Pixel distance under which two keypoints of the same type are the same person.
    #[structopt(short, long, default_value = "20")]
    pub nms_radius: f32,
    /// Chebyshev radius of the local maximum window, in grid cells.
    #[structopt(short = "r", long, default_value = "1")]
    pub local_maximum_radius: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            output_stride: constants::OUTPUT_STRIDE,
            max_pose_detections: constants::MAX_POSE_DETECTIONS,
            score_threshold: constants::SCORE_THRESHOLD,
            min_pose_score: constants::MIN_POSE_SCORE,
            nms_radius: constants::NMS_RADIUS,
            local_maximum_radius: constants::LOCAL_MAXIMUM_RADIUS,
        }
    }
}

impl DecoderConfig {
    pub fn validate(&self) -> Result<(), Error> {
        if self.output_stride == 0 {
            return Err(Error::InvalidConfig("output stride must be positive"));
        }
        if self.max_pose_detections == 0 {
            return Err(Error::InvalidConfig("max pose detections must be positive"));
        }
        if self.nms_radius.is_nan() || self.nms_radius < 0.0 {
            return Err(Error::InvalidConfig("nms radius must be a non-negative number"));
        }
        if self.score_threshold.is_nan() || self.min_pose_score.is_nan() {
            return Err(Error::InvalidConfig("score thresholds must be numbers"));
        }
        Ok(())
    }
}

/// Decodes the raw outputs of a multi-person PoseNet model into poses.
#[derive(Debug, Clone)]
pub struct Decoder {
    config: DecoderConfig,
    skeleton: SkeletonGraph,
}

impl Decoder {
    pub fn new(config: DecoderConfig) -> Result<Self, Error> {
        Self::with_skeleton(config, SkeletonGraph::default())
    }

    pub fn with_skeleton(config: DecoderConfig, skeleton: SkeletonGraph) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self { config, skeleton })
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    pub fn skeleton(&self) -> &SkeletonGraph {
        &self.skeleton
    }

    /// Decode every pose in `outputs`, with keypoints mapped to source image space by
    /// `scale`.
    pub fn decode(&self, outputs: &ModelOutputs<'_>, scale: Scale) -> Result<PoseSet, Error> {
        let mut poses = self.decode_unscaled(outputs)?;
        poses.rescale(scale);
        Ok(poses)
    }

    /// Decode every pose in `outputs`, leaving keypoints in network input space.
    pub fn decode_unscaled(&self, outputs: &ModelOutputs<'_>) -> Result<PoseSet, Error> {
        let DecoderConfig {
            output_stride,
            max_pose_detections,
            score_threshold,
            min_pose_score,
            nms_radius,
            local_maximum_radius,
        } = self.config;
        let output_stride = f32::from(output_stride);
        let squared_nms_radius = nms_radius.powi(2);

        let mut candidates =
            extract_local_maxima(&outputs.heatmaps, score_threshold, local_maximum_radius)?;
        rank(&mut candidates);
        debug!(candidates = candidates.len(), "extracted local maxima");

        let mut poses = PoseSet::with_capacity(max_pose_detections);

        for candidate in &candidates {
            if poses.len() >= max_pose_detections {
                break;
            }

            let root = seed_point(outputs, candidate, output_stride)?;
            if within_nms_radius(&poses, root, candidate.kind, squared_nms_radius) {
                trace!(kind = %candidate.kind, x = root.x(), y = root.y(), "seed suppressed");
                continue;
            }

            let mut pose = decode_pose(
                outputs,
                &self.skeleton,
                candidate.kind,
                candidate.score.into_inner(),
                root,
                output_stride,
            )?;
            pose.score = instance_score(&poses, &pose.keypoints, squared_nms_radius)?;

            if pose.score > min_pose_score {
                debug!(score = pose.score, seed = %candidate.kind, "accepted pose");
                poses.push(pose);
            } else {
                trace!(score = pose.score, seed = %candidate.kind, "discarded pose");
            }
        }

        Ok(poses)
    }
}
