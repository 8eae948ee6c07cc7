use crate::graph::NetworkPath;
use crate::transition::{Candidate, Strategy};

use geo::{Distance, Haversine};

pub trait TransitionStrategy: for<'a> Strategy<TransitionContext<'a>> {}
impl<T> TransitionStrategy for T where T: for<'a> Strategy<TransitionContext<'a>> {}

#[derive(Clone, Copy, Debug)]
pub struct TransitionContext<'a> {
    /// The shortest path along the network between the
    /// source candidate and target candidate.
    pub optimal_path: &'a NetworkPath,

    /// The source candidate indicating the segment and
    /// position at which the path begins.
    pub source_candidate: &'a Candidate,

    /// The target candidate indicating the segment and
    /// position at which the path ends.
    pub target_candidate: &'a Candidate,

    /// Seconds elapsed between the two observations, if both were timestamped.
    pub elapsed: Option<f64>,
}

pub struct TransitionLengths {
    /// The great circle distance between the two raw observations
    pub straightline_distance: f64,

    /// The length of the optimal route between candidates
    pub route_length: f64,
}

impl TransitionLengths {
    /// The absolute difference (in meters) between the route length
    /// and the straightline distance.
    ///
    /// For example, two observations `100m` apart whose candidates have
    /// an optimal route of `130m` between them have a detour of `30m`.
    /// A route which is *shorter* than the straightline distance is
    /// equally suspect, as the observations then suggest a detour the
    /// network does not contain.
    #[inline]
    pub fn detour(&self) -> f64 {
        (self.route_length - self.straightline_distance).abs()
    }
}

impl TransitionContext<'_> {
    pub fn lengths(&self) -> TransitionLengths {
        TransitionLengths {
            straightline_distance: Haversine.distance(
                self.source_candidate.origin,
                self.target_candidate.origin,
            ),
            route_length: self.optimal_path.length,
        }
    }

    /// The speed (meters per second) implied by travelling the optimal path in the elapsed time.
    /// Only known where both observations were timestamped.
    ///
    /// Observations sharing a timestamp imply an infinite speed for any
    /// path of non-zero length.
    pub fn implied_speed(&self) -> Option<f64> {
        let elapsed = self.elapsed?;
        let length = self.optimal_path.length;

        Some(match elapsed > 0.0 {
            true => length / elapsed,
            false if length > 0.0 => f64::INFINITY,
            false => 0.0,
        })
    }
}
