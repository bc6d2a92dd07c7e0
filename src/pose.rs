use crate::{error::Error, geometry::Scale, point::Point};
use ndarray::{Array1, Array2, Array3};
use num_traits::FromPrimitive;
use std::{fmt, ops::Deref, str::FromStr};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, num_derive::FromPrimitive)]
pub enum KeypointKind {
    Nose,
    LeftEye,
    RightEye,
    LeftEar,
    RightEar,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
}

impl KeypointKind {
    pub const ALL: [Self; NUM_KEYPOINTS] = [
        Self::Nose,
        Self::LeftEye,
        Self::RightEye,
        Self::LeftEar,
        Self::RightEar,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftWrist,
        Self::RightWrist,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftAnkle,
        Self::RightAnkle,
    ];

    /// Heatmap channel of this keypoint type.
    #[inline]
    pub fn idx(self) -> usize {
        self as usize
    }

    pub fn from_idx(index: usize) -> Result<Self, Error> {
        Self::from_usize(index).ok_or(Error::ConvertUSizeToKeypointKind(index))
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Nose => "nose",
            Self::LeftEye => "leftEye",
            Self::RightEye => "rightEye",
            Self::LeftEar => "leftEar",
            Self::RightEar => "rightEar",
            Self::LeftShoulder => "leftShoulder",
            Self::RightShoulder => "rightShoulder",
            Self::LeftElbow => "leftElbow",
            Self::RightElbow => "rightElbow",
            Self::LeftWrist => "leftWrist",
            Self::RightWrist => "rightWrist",
            Self::LeftHip => "leftHip",
            Self::RightHip => "rightHip",
            Self::LeftKnee => "leftKnee",
            Self::RightKnee => "rightKnee",
            Self::LeftAnkle => "leftAnkle",
            Self::RightAnkle => "rightAnkle",
        }
    }
}

impl fmt::Display for KeypointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for KeypointKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| Error::UnknownKeypointName(s.to_owned()))
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Keypoint {
    pub kind: KeypointKind,
    pub point: Point,
    /// Zero while the keypoint has not been decoded.
    pub score: f32,
}

impl Keypoint {
    pub fn empty(kind: KeypointKind) -> Self {
        Self {
            kind,
            point: Point::ORIGIN,
            score: 0.0,
        }
    }

    #[inline]
    pub fn is_decoded(&self) -> bool {
        self.score > 0.0
    }
}

pub const NUM_KEYPOINTS: usize = 17;
pub type Keypoints = [Keypoint; NUM_KEYPOINTS];

/// A single person, one keypoint per [`KeypointKind`] indexed by [`KeypointKind::idx`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Pose {
    pub keypoints: Keypoints,
    pub score: f32,
}

impl Pose {
    pub fn empty() -> Self {
        Self {
            keypoints: KeypointKind::ALL.map(Keypoint::empty),
            score: 0.0,
        }
    }

    #[inline]
    pub fn keypoint(&self, kind: KeypointKind) -> &Keypoint {
        &self.keypoints[kind.idx()]
    }

    pub fn rescale(&mut self, Scale { x, y }: Scale) {
        self.keypoints
            .iter_mut()
            .for_each(|keypoint| keypoint.point = keypoint.point.scaled(x, y));
    }

    /// Keypoints confident enough to be drawn.
    pub fn visible_keypoints(&self, threshold: f32) -> impl Iterator<Item = &Keypoint> + '_ {
        self.keypoints
            .iter()
            .filter(move |keypoint| keypoint.score > threshold)
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::empty()
    }
}

/// Accepted poses in the order they were discovered.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PoseSet(Vec<Pose>);

impl PoseSet {
    pub fn with_capacity(capacity: usize) -> Self {
        Self(Vec::with_capacity(capacity))
    }

    pub(crate) fn push(&mut self, pose: Pose) {
        self.0.push(pose);
    }

    pub fn rescale(&mut self, scale: Scale) {
        self.0.iter_mut().for_each(|pose| pose.rescale(scale));
    }

    pub fn into_inner(self) -> Vec<Pose> {
        self.0
    }

    /// Parallel arrays of pose scores `[N]`, keypoint scores `[N, K]` and keypoint
    /// coordinates `[N, K, 2]` stored as `(y, x)`.
    pub fn to_arrays(&self) -> (Array1<f32>, Array2<f32>, Array3<f32>) {
        let nposes = self.0.len();
        let mut pose_scores = Array1::zeros(nposes);
        let mut keypoint_scores = Array2::zeros((nposes, NUM_KEYPOINTS));
        let mut keypoint_coords = Array3::zeros((nposes, NUM_KEYPOINTS, 2));

        for (i, pose) in self.0.iter().enumerate() {
            pose_scores[i] = pose.score;
            for (j, keypoint) in pose.keypoints.iter().enumerate() {
                keypoint_scores[(i, j)] = keypoint.score;
                keypoint_coords[(i, j, 0)] = keypoint.point.y();
                keypoint_coords[(i, j, 1)] = keypoint.point.x();
            }
        }
        (pose_scores, keypoint_scores, keypoint_coords)
    }
}

impl Deref for PoseSet {
    type Target = [Pose];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl IntoIterator for PoseSet {
    type Item = Pose;
    type IntoIter = std::vec::IntoIter<Pose>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a PoseSet {
    type Item = &'a Pose;
    type IntoIter = std::slice::Iter<'a, Pose>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

pub mod constants {
    use crate::pose::KeypointKind::{self, *};

    pub const NUM_EDGES: usize = super::NUM_KEYPOINTS - 1;

    pub const OUTPUT_STRIDE: u8 = 16;
    pub const MAX_POSE_DETECTIONS: usize = 10;
    pub const SCORE_THRESHOLD: f32 = 0.5;
    pub const MIN_POSE_SCORE: f32 = 0.25;
    pub const NMS_RADIUS: f32 = 20.0;
    pub const LOCAL_MAXIMUM_RADIUS: usize = 1;

    /// Parent to child edges of the skeleton tree. The position of an edge selects its
    /// displacement channels.
    pub const POSE_CHAIN: [(KeypointKind, KeypointKind); NUM_EDGES] = [
        (Nose, LeftEye),
        (LeftEye, LeftEar),
        (Nose, RightEye),
        (RightEye, RightEar),
        (Nose, LeftShoulder),
        (LeftShoulder, LeftElbow),
        (LeftElbow, LeftWrist),
        (LeftShoulder, LeftHip),
        (LeftHip, LeftKnee),
        (LeftKnee, LeftAnkle),
        (Nose, RightShoulder),
        (RightShoulder, RightElbow),
        (RightElbow, RightWrist),
        (RightShoulder, RightHip),
        (RightHip, RightKnee),
        (RightKnee, RightAnkle),
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    mod keypoint_kind_tests {
        use super::{KeypointKind, NUM_KEYPOINTS};

        #[test]
        fn all_is_in_index_order() {
            for (i, kind) in KeypointKind::ALL.iter().enumerate() {
                assert_eq!(kind.idx(), i);
                assert_eq!(KeypointKind::from_idx(i).unwrap(), *kind);
            }
        }

        #[test]
        fn from_idx_out_of_range() {
            assert!(KeypointKind::from_idx(NUM_KEYPOINTS).is_err());
        }

        #[test]
        fn names_round_trip() {
            for kind in KeypointKind::ALL {
                assert_eq!(kind.name().parse::<KeypointKind>().unwrap(), kind);
            }
        }

        #[test]
        fn unknown_name() {
            assert!("leftToe".parse::<KeypointKind>().is_err());
        }
    }

    mod pose_tests {
        use super::{KeypointKind, Point, Pose, PoseSet, Scale};

        fn sample_pose() -> Pose {
            let mut pose = Pose::empty();
            pose.score = 0.7;
            pose.keypoints[KeypointKind::Nose.idx()].score = 0.9;
            pose.keypoints[KeypointKind::Nose.idx()].point = Point::new(100.0, 50.0);
            pose.keypoints[KeypointKind::LeftEye.idx()].score = 0.3;
            pose.keypoints[KeypointKind::LeftEye.idx()].point = Point::new(90.0, 40.0);
            pose
        }

        #[test]
        fn empty_pose_keypoints_are_undecoded() {
            let pose = Pose::empty();
            for (i, keypoint) in pose.keypoints.iter().enumerate() {
                assert_eq!(keypoint.kind.idx(), i);
                assert!(!keypoint.is_decoded());
            }
        }

        #[test]
        fn identity_rescale_is_noop() {
            let mut pose = sample_pose();
            let before = pose;
            pose.rescale(Scale::IDENTITY);
            assert_eq!(pose, before);
        }

        #[test]
        fn rescale_scales_every_keypoint() {
            let mut poses = PoseSet::default();
            poses.push(sample_pose());
            poses.rescale(Scale { x: 2.0, y: 0.5 });
            let nose = poses[0].keypoint(KeypointKind::Nose);
            assert_eq!(nose.point, Point::new(200.0, 25.0));
        }

        #[test]
        fn visible_keypoints_filters_by_threshold() {
            let pose = sample_pose();
            let visible: Vec<_> = pose.visible_keypoints(0.5).map(|k| k.kind).collect();
            assert_eq!(visible, vec![KeypointKind::Nose]);
        }

        #[test]
        fn to_arrays_stores_yx() {
            let mut poses = PoseSet::default();
            poses.push(sample_pose());
            let (scores, keypoint_scores, coords) = poses.to_arrays();
            assert_eq!(scores.len(), 1);
            assert_eq!(scores[0], 0.7);
            assert_eq!(keypoint_scores[(0, 0)], 0.9);
            assert_eq!(coords[(0, 0, 0)], 50.0);
            assert_eq!(coords[(0, 0, 1)], 100.0);
        }
    }
}
