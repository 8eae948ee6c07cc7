use crate::config::MatchOptions;
use crate::geo::Trace;
use crate::graph::{Graph, Match};
use crate::transition::*;

use log::info;

#[cfg(feature = "tracing")]
use tracing::Level;

impl Match for Graph {
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, level = Level::INFO))]
    fn r#match(&self, trace: &Trace, options: &MatchOptions) -> Result<MatchResult, MatchError> {
        info!("Finding matched route for {} positions", trace.len());
        let costing = CostingStrategies::from_options(options);

        // Create our hidden markov model solver
        let transition = Transition::new(self, trace, options, costing)?;
        let solver = ViterbiSolver::new(options.break_policy);

        // Collapse the layers into the best candidate sequence,
        // and stitch that sequence into the route.
        let collapse = transition.solve(solver)?;
        let result = RouteAssembler::new(self)
            .simplify(options.simplify_tolerance)
            .assemble(&transition, collapse);

        info!(
            "Matched {} of {} positions with confidence {:.3}",
            result.matched(),
            trace.len(),
            result.confidence()
        );

        Ok(result)
    }
}
