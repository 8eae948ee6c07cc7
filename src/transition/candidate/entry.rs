use crate::graph::{Position, SegmentId};

use geo::Point;

/// The location of a candidate within the layers of a transition graph.
///
/// The `layer_id` is the index of the layer, and the `node_id` is the index
/// of the candidate within that layer (its rank by distance).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CandidateLocation {
    pub layer_id: usize,
    pub node_id: usize,
}

/// A hypothesised position on the network for a single observation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate {
    /// The segment upon which the candidate lies.
    pub segment: SegmentId,

    /// Distance (meters) along the segment at which the candidate lies.
    pub offset: f64,

    /// The projected position upon the segment.
    pub position: Point,

    /// The raw observation the candidate was generated for.
    pub origin: Point,

    /// Distance (meters) between the observation and the projected position.
    pub distance: f64,

    /// The emission probability of the candidate, in `(0, 1]`.
    pub emission: f64,

    pub location: CandidateLocation,
}

impl Candidate {
    /// The candidate as a position on the network, used for routing.
    #[inline]
    pub fn network_position(&self) -> Position {
        Position {
            segment: self.segment,
            offset: self.offset,
        }
    }

    /// Moves the candidate into the layer `layer_id`.
    #[inline]
    pub fn in_layer(self, layer_id: usize) -> Self {
        Candidate {
            location: CandidateLocation {
                layer_id,
                ..self.location
            },
            ..self
        }
    }
}
