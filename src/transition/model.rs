use crate::config::MatchOptions;
use crate::graph::{NetworkPath, Route};
use crate::transition::*;
use crate::Graph;

use geo::{Distance, Haversine};

/// A scored transition from a candidate of one layer to a candidate of the next.
#[derive(Clone, Debug, PartialEq)]
pub struct TransitionEdge {
    pub source: CandidateLocation,
    pub target: CandidateLocation,

    /// The routed distance (meters) between the candidates,
    /// or `None` if they are not connected within the search bound.
    pub distance: Option<f64>,

    /// The transition probability. Exactly zero where the transition is forbidden.
    pub probability: f64,

    /// The shortest path between the candidates, if one was found.
    pub path: Option<NetworkPath>,
}

impl TransitionEdge {
    #[inline]
    pub fn is_forbidden(&self) -> bool {
        self.probability <= 0.0
    }
}

/// Scores transitions between candidates of consecutive observations.
///
/// Routes are found along the network using a bounded search, so that
/// candidates which are distant along the network are never expanded in full.
/// The bound is the great-circle distance of the observations scaled by the
/// maximum detour ratio (allowing for a search radius of error at either end),
/// and, where the observations are timed, the distance travelled at the speed
/// ceiling in the elapsed time.
pub struct TransitionModel<'a, E, T>
where
    E: EmissionStrategy,
    T: TransitionStrategy,
{
    map: &'a Graph,
    heuristics: &'a CostingStrategies<E, T>,

    pub max_detour_ratio: f64,
    pub search_radius: f64,
    pub speed_ceiling: f64,
}

impl<'a, E, T> TransitionModel<'a, E, T>
where
    E: EmissionStrategy,
    T: TransitionStrategy,
{
    pub fn new(
        map: &'a Graph,
        heuristics: &'a CostingStrategies<E, T>,
        options: &MatchOptions,
    ) -> Self {
        TransitionModel {
            map,
            heuristics,
            max_detour_ratio: options.max_detour_ratio,
            search_radius: options.search_radius,
            speed_ceiling: options.speed_ceiling,
        }
    }

    /// The longest route (meters) searched for between observations
    /// `straightline` meters apart, observed `elapsed` seconds apart.
    pub fn bound(&self, straightline: f64, elapsed: Option<f64>) -> f64 {
        let detour = straightline * self.max_detour_ratio + 2.0 * self.search_radius;

        match elapsed {
            Some(elapsed) => detour.min(self.speed_ceiling * elapsed.max(0.0)),
            None => detour,
        }
    }

    /// Scores the transition from `source` to `target`, observed `elapsed` seconds apart.
    pub fn score(
        &self,
        source: &Candidate,
        target: &Candidate,
        elapsed: Option<f64>,
    ) -> TransitionEdge {
        self.score_many(source, std::slice::from_ref(target), elapsed)
            .into_iter()
            .next()
            .unwrap_or(TransitionEdge {
                source: source.location,
                target: target.location,
                distance: None,
                probability: 0.0,
                path: None,
            })
    }

    /// Scores the transitions from `source` to each of the `targets`, using a
    /// single routing search. The result holds one edge per target, in order.
    pub fn score_many(
        &self,
        source: &Candidate,
        targets: &[Candidate],
        elapsed: Option<f64>,
    ) -> Vec<TransitionEdge> {
        let bounds = targets
            .iter()
            .map(|target| self.bound(Haversine.distance(source.origin, target.origin), elapsed))
            .collect::<Vec<_>>();

        let positions = targets
            .iter()
            .map(Candidate::network_position)
            .collect::<Vec<_>>();

        let limit = bounds.iter().copied().fold(0.0, f64::max);
        let paths = self
            .map
            .route_many(&source.network_position(), &positions, limit);

        targets
            .iter()
            .zip(paths)
            .zip(bounds)
            .map(|((target, path), bound)| {
                let path = path.filter(|path| path.length <= bound);
                let probability = path.as_ref().map_or(0.0, |optimal_path| {
                    self.heuristics.transition(TransitionContext {
                        optimal_path,
                        source_candidate: source,
                        target_candidate: target,
                        elapsed,
                    })
                });

                TransitionEdge {
                    source: source.location,
                    target: target.location,
                    distance: path.as_ref().map(|path| path.length),
                    probability,
                    path,
                }
            })
            .collect()
    }
}
