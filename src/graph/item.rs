use crate::graph::{NodeId, RoadSegment, SegmentId};

use geo::{Line, LineLocatePoint, Point};
use petgraph::prelude::DiGraphMap;
use rstar::{PointDistance, RTree, RTreeObject, AABB};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use std::fmt::{Debug, Formatter};

/// The segments joining two junctions in a single direction.
/// Parallel segments between the same junctions are all retained.
pub type Connections = SmallVec<[SegmentId; 2]>;

pub type GraphStructure = DiGraphMap<NodeId, Connections>;

/// Routing graph of the road network.
///
/// Created using [`Graph::from_segments`], or from a dataset using
/// [`Graph::from_file`], and is read-only thereafter. All query
/// functionality is given by the [`Scan`](crate::Scan),
/// [`Route`](crate::Route) and [`Match`](crate::graph::Match) traits.
pub struct Graph {
    /// Directed junction-to-junction connectivity. Segments which
    /// are not one-way are inserted in both directions.
    pub(crate) graph: GraphStructure,

    /// Segment flyweight
    pub(crate) segments: FxHashMap<SegmentId, RoadSegment>,

    /// Every line of every segment, indexed by its bounding box.
    pub(crate) index: RTree<SegmentPiece>,
}

impl Debug for Graph {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Graph with Segments: {}, Junctions: {}",
            self.segments.len(),
            self.graph.node_count()
        )
    }
}

impl Graph {
    pub fn index(&self) -> &RTree<SegmentPiece> {
        &self.index
    }

    /// The number of segments in the network.
    pub fn size(&self) -> usize {
        self.segments.len()
    }

    #[inline]
    pub fn segment(&self, id: &SegmentId) -> Option<&RoadSegment> {
        self.segments.get(id)
    }

    pub fn segments(&self) -> impl Iterator<Item = &RoadSegment> {
        self.segments.values()
    }

    /// The outgoing connections of a junction, as `(next junction, segment)` pairs.
    #[inline]
    pub(crate) fn successors(&self, node: NodeId) -> impl Iterator<Item = (NodeId, &RoadSegment)> {
        self.graph
            .edges_directed(node, petgraph::Direction::Outgoing)
            .flat_map(move |(_, next, connections)| {
                connections
                    .iter()
                    .filter_map(move |id| self.segments.get(id))
                    .map(move |segment| (next, segment))
            })
    }
}

/// A single line of a [`RoadSegment`], the unit stored within the spatial index.
///
/// Indexing individual lines (rather than whole polylines) keeps the bounding
/// boxes tight for long, curving segments.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SegmentPiece {
    pub segment: SegmentId,
    pub line: Line,
}

impl SegmentPiece {
    pub fn new(segment: SegmentId, line: Line) -> Self {
        Self { segment, line }
    }
}

impl RTreeObject for SegmentPiece {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(
            [self.line.start.x, self.line.start.y],
            [self.line.end.x, self.line.end.y],
        )
    }
}

impl PointDistance for SegmentPiece {
    /// Squared planar distance (in degrees) to the closest point on the line.
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let origin = Point::new(point[0], point[1]);
        let fraction = self
            .line
            .line_locate_point(&origin)
            .filter(|frac| frac.is_finite())
            .unwrap_or(0.0)
            .clamp(0.0, 1.0);

        let closest = self.line.start + (self.line.end - self.line.start) * fraction;
        (closest.x - point[0]).powi(2) + (closest.y - point[1]).powi(2)
    }
}
