use crate::graph::{Graph, SegmentId};

use geo::Coord;
use serde::Serialize;

/// A position on the network: a distance (meters) along a segment.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Position {
    pub segment: SegmentId,
    pub offset: f64,
}

/// A traversal of a single segment, between two offsets.
///
/// Where `from` is greater than `to`, the segment is travelled
/// against the direction of its geometry.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Traversal {
    pub segment: SegmentId,
    pub from: f64,
    pub to: f64,
}

impl Traversal {
    #[inline]
    pub fn length(&self) -> f64 {
        (self.to - self.from).abs()
    }
}

/// The shortest path found between two [`Position`]s.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct NetworkPath {
    /// The ordered traversals making up the path, the first
    /// leaving the source position and the last arriving at the target.
    pub traversals: Vec<Traversal>,

    /// The total length of the path, in meters.
    pub length: f64,
}

impl NetworkPath {
    pub(crate) fn new(traversals: Vec<Traversal>) -> Self {
        let traversals = traversals
            .into_iter()
            .filter(|traversal| traversal.length() > 0.0)
            .collect::<Vec<_>>();

        let length = traversals.iter().map(Traversal::length).sum();
        NetworkPath { traversals, length }
    }

    /// The segments traversed, in order of travel.
    pub fn segments(&self) -> impl Iterator<Item = SegmentId> + '_ {
        self.traversals.iter().map(|traversal| traversal.segment)
    }

    /// The polyline of the path, following the geometry of each traversed segment.
    pub fn coordinates(&self, graph: &Graph) -> Vec<Coord> {
        self.traversals
            .iter()
            .filter_map(|traversal| {
                graph
                    .segment(&traversal.segment)
                    .map(|segment| segment.slice(traversal.from, traversal.to))
            })
            .flatten()
            .collect()
    }
}

/// Network routing between on-network positions.
pub trait Route {
    /// Finds the shortest path from `source` to `target` along the network,
    /// respecting the directionality of each segment.
    ///
    /// Returns `None` if no path no longer than `bound` meters exists.
    fn route_between(&self, source: &Position, target: &Position, bound: f64)
        -> Option<NetworkPath>;

    /// Finds the shortest path from `source` to each of the `targets`, in a single
    /// bounded search. The result holds one entry per target, in the same order.
    fn route_many(
        &self,
        source: &Position,
        targets: &[Position],
        bound: f64,
    ) -> Vec<Option<NetworkPath>>;
}
