use crate::config::MatchOptions;
use crate::geo::Trace;
use crate::graph::Graph;
use crate::transition::*;

use geo::{Distance, Haversine};
use log::debug;
use std::time::Instant;

/// A map-specific transition graph based on the Hidden-Markov-Model structure.
///
/// This is the orchestration point for solving transition graphs for making
/// map-matching requests. It requires a [map](Graph) on instantiation, as well as
/// a [trace](Trace) to solve for.
///
/// ### Example
///
/// Below is an example that matches a trace onto the map. To see how the
/// solution is turned into a route, see the [`RouteAssembler`].
///
/// ```rust
/// use trace_matcher::{Graph, MatchOptions, MatchResult, Trace};
/// use trace_matcher::transition::{CostingStrategies, RouteAssembler, Transition, ViterbiSolver};
///
/// fn match_trace(map: &Graph, trace: &Trace) -> Option<MatchResult> {
///     let options = MatchOptions::default();
///
///     // Use the default costing strategies
///     let costing = CostingStrategies::from_options(&options);
///
///     // Create our transition graph, supplying our map for context,
///     // and the trace we wish to load as the layer data.
///     let transition = Transition::new(map, trace, &options, costing).ok()?;
///
///     // Now.. we simply solve the transition graph using the solver
///     let solution = transition.solve(ViterbiSolver::default()).ok()?;
///
///     // And stitch the solution into a route along the map.
///     Some(RouteAssembler::new(map).assemble(&transition, solution))
/// }
/// ```
pub struct Transition<'a, E, T>
where
    E: EmissionStrategy,
    T: TransitionStrategy,
{
    pub(crate) map: &'a Graph,
    pub(crate) trace: &'a Trace,
    pub(crate) options: &'a MatchOptions,
    pub(crate) heuristics: CostingStrategies<E, T>,

    pub(crate) layers: Layers,

    /// For each observation, the index of the observation it was folded into.
    /// Observations which were kept are their own representative.
    pub(crate) representatives: Vec<usize>,

    started: Instant,
}

impl<'a, E, T> Transition<'a, E, T>
where
    E: EmissionStrategy,
    T: TransitionStrategy,
{
    /// Creates a new transition graph from the input trace and heuristics.
    ///
    /// ### Warning
    ///
    /// This function is expensive. Unlike many other `::new(..)` functions, this
    /// function calls out to the [`LayerGenerator`]. The time spent generating
    /// layers counts towards the timeout of the match.
    pub fn new(
        map: &'a Graph,
        trace: &'a Trace,
        options: &'a MatchOptions,
        heuristics: CostingStrategies<E, T>,
    ) -> Result<Transition<'a, E, T>, MatchError> {
        let started = Instant::now();
        options.validate()?;

        if trace.len() > options.max_trace_points {
            return Err(MatchError::TraceTooComplex(Complexity::TooManyPoints {
                points: trace.len(),
                limit: options.max_trace_points,
            }));
        }

        let (kept, representatives) = Self::fold(trace, options.dedupe_distance);
        debug!(
            "Folded {} of {} observations into their predecessors",
            trace.len() - kept.len(),
            trace.len()
        );

        // Generate the layers of the kept observations.
        let layers = LayerGenerator::new(map, &heuristics)
            .with_limits(options.max_candidates, options.search_radius)
            .with_trace(trace, &kept);

        debug!(
            "Generated {} layers with {} candidates",
            layers.len(),
            layers.candidates()
        );

        Ok(Transition {
            map,
            trace,
            options,
            heuristics,
            layers,
            representatives,
            started,
        })
    }

    /// Folds each observation lying within `distance` meters of the last
    /// kept observation into it. Returns the indices of the kept observations,
    /// and the representative of every observation.
    fn fold(trace: &Trace, distance: f64) -> (Vec<usize>, Vec<usize>) {
        let mut kept: Vec<usize> = Vec::with_capacity(trace.len());
        let mut representatives = Vec::with_capacity(trace.len());

        for (index, coordinate) in trace.iter().enumerate() {
            match kept.last() {
                Some(&last)
                    if Haversine.distance(trace[last].point(), coordinate.point()) < distance =>
                {
                    representatives.push(last)
                }
                _ => {
                    kept.push(index);
                    representatives.push(index);
                }
            }
        }

        (kept, representatives)
    }

    pub fn layers(&self) -> &Layers {
        &self.layers
    }

    pub fn trace(&self) -> &Trace {
        self.trace
    }

    /// The transition model scoring moves between the layers.
    pub fn model(&self) -> TransitionModel<'_, E, T> {
        TransitionModel::new(self.map, &self.heuristics, self.options)
    }

    /// Seconds elapsed between the observations at the trace indices `from` and `to`.
    pub fn elapsed(&self, from: usize, to: usize) -> Option<f64> {
        let (from, to) = (self.trace.get(from)?, self.trace.get(to)?);
        from.seconds_until(to)
    }

    /// Fails with [`MatchError::TraceTooComplex`] once the time budget is spent.
    pub fn check_deadline(&self) -> Result<(), MatchError> {
        if self.started.elapsed() >= self.options.timeout {
            return Err(MatchError::TraceTooComplex(Complexity::Timeout {
                limit: self.options.timeout,
            }));
        }

        Ok(())
    }

    /// Solves the transition graph, using the provided [`Solver`].
    pub fn solve(&self, solver: impl Solver) -> Result<Collapse, MatchError> {
        // Indirection to call.
        solver.solve(self)
    }
}
