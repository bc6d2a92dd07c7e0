use crate::{
    error::Error,
    pose::{constants, KeypointKind, NUM_KEYPOINTS},
};

/// A directed parent to child link of the skeleton tree. `index` selects the edge's
/// channels in the displacement fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub index: usize,
    pub parent: KeypointKind,
    pub child: KeypointKind,
}

/// The tree of limbs connecting keypoint types. Built once and shared by every decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkeletonGraph {
    edges: Vec<Edge>,
}

impl SkeletonGraph {
    /// Build a graph from `(parent, child)` pairs. A tree over `NUM_KEYPOINTS` nodes has
    /// exactly `NUM_KEYPOINTS - 1` edges; anything else is rejected.
    pub fn new(pairs: &[(KeypointKind, KeypointKind)]) -> Result<Self, Error> {
        let expected = NUM_KEYPOINTS - 1;
        if pairs.len() != expected {
            return Err(Error::SkeletonEdgeCount {
                expected,
                actual: pairs.len(),
            });
        }
        let edges = pairs
            .iter()
            .enumerate()
            .map(|(index, &(parent, child))| {
                if parent == child {
                    Err(Error::SkeletonSelfLoop {
                        index,
                        kind: parent,
                    })
                } else {
                    Ok(Edge {
                        index,
                        parent,
                        child,
                    })
                }
            })
            .collect::<Result<_, _>>()?;
        Ok(Self { edges })
    }

    /// Build a graph from keypoint names such as `("leftShoulder", "leftElbow")`.
    pub fn from_names(pairs: &[(&str, &str)]) -> Result<Self, Error> {
        let pairs = pairs
            .iter()
            .map(|&(parent, child)| Ok((parent.parse()?, child.parse()?)))
            .collect::<Result<Vec<(KeypointKind, KeypointKind)>, Error>>()?;
        Self::new(&pairs)
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }
}

impl Default for SkeletonGraph {
    fn default() -> Self {
        Self {
            edges: constants::POSE_CHAIN
                .iter()
                .enumerate()
                .map(|(index, &(parent, child))| Edge {
                    index,
                    parent,
                    child,
                })
                .collect(),
        }
    }
}
