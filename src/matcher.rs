//! The matching engine handle.

use crate::api::{MatchRequest, MatchResponse};
use crate::config::{ConfigError, MatchOptions, MatchOverrides};
use crate::geo::Trace;
use crate::graph::{Graph, Match};
use crate::transition::{MatchError, MatchResult};

use log::debug;
use rayon::prelude::*;
use std::sync::Arc;

#[cfg(feature = "tracing")]
use tracing::Level;

/// A shareable handle to the map-matching engine.
///
/// The [`Graph`] is loaded once and is immutable thereafter, so the handle is
/// cheap to clone, and any number of requests may be matched concurrently
/// against it without synchronisation. Each request is matched on a single task.
///
/// ```rust,no_run
/// use trace_matcher::{Graph, MatchOptions, Matcher};
///
/// let graph = Graph::from_file("network.json").expect("network must load");
/// let matcher = Matcher::new(graph, MatchOptions::default()).expect("options must be valid");
/// ```
#[derive(Clone, Debug)]
pub struct Matcher {
    graph: Arc<Graph>,
    options: MatchOptions,
}

impl Matcher {
    pub fn new(graph: Graph, options: MatchOptions) -> Result<Self, ConfigError> {
        Matcher::shared(Arc::new(graph), options)
    }

    /// Creates a matcher over a graph which is already shared.
    pub fn shared(graph: Arc<Graph>, options: MatchOptions) -> Result<Self, ConfigError> {
        options.validate()?;
        Ok(Matcher { graph, options })
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn options(&self) -> &MatchOptions {
        &self.options
    }

    /// Matches the `trace` using the options of the matcher.
    pub fn match_trace(&self, trace: &Trace) -> Result<MatchResult, MatchError> {
        self.graph.r#match(trace, &self.options)
    }

    /// Matches the `trace`, with request-level `overrides` applied over the options of the matcher.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = Level::INFO, skip(self, trace)))]
    pub fn match_with(
        &self,
        trace: &Trace,
        overrides: &MatchOverrides,
    ) -> Result<MatchResult, MatchError> {
        let options = self.options.with_overrides(overrides);
        self.graph.r#match(trace, &options)
    }

    /// Matches many independent traces in parallel. Results are returned in the order of `traces`.
    pub fn match_many(&self, traces: &[Trace]) -> Vec<Result<MatchResult, MatchError>> {
        debug!("Matching {} traces in parallel", traces.len());

        traces
            .par_iter()
            .map(|trace| self.match_trace(trace))
            .collect()
    }

    /// Handles a request from the front end.
    pub fn handle(&self, request: MatchRequest) -> Result<MatchResponse, MatchError> {
        let trace = request.trace()?;

        self.match_with(&trace, &request.options)
            .map(MatchResponse::from)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::BreakPolicy;
    use crate::fixtures::{at, grid, straight_road, trace};
    use crate::geo::Coordinate;

    use chrono::Duration;

    fn matcher() -> Matcher {
        let graph = grid(5, 100.0).expect("fixture must build");
        Matcher::new(graph, MatchOptions::default()).expect("options must be valid")
    }

    #[test]
    fn rejects_invalid_options() {
        let graph = straight_road().expect("fixture must build");
        let options = MatchOptions {
            search_radius: -1.0,
            ..MatchOptions::default()
        };

        assert!(Matcher::new(graph, options).is_err());
    }

    #[test]
    fn concurrent_matches_agree_with_sequential() {
        let matcher = matcher();

        let traces = (0..8)
            .map(|i| {
                let row = (i % 4) as f64 * 100.0;
                let points = (0..6)
                    .map(|step| at(step as f64 * 70.0, row + 3.0))
                    .collect::<Vec<_>>();

                trace(&points, Duration::seconds(6)).expect("trace must be valid")
            })
            .collect::<Vec<_>>();

        let concurrent = matcher.match_many(&traces);
        let sequential = traces
            .iter()
            .map(|trace| matcher.match_trace(trace))
            .collect::<Vec<_>>();

        assert_eq!(concurrent.len(), traces.len());
        for (concurrent, sequential) in concurrent.into_iter().zip(sequential) {
            let (concurrent, sequential) = (
                concurrent.expect("must match"),
                sequential.expect("must match"),
            );

            assert_eq!(concurrent, sequential);
        }
    }

    #[test]
    fn overrides_apply_per_request() {
        let matcher = matcher();
        let trace = trace(&[at(40.0, 40.0), at(60.0, 40.0)], Duration::seconds(10))
            .expect("trace must be valid");

        // 40m from the nearest road, beyond a 20m radius.
        let narrow = MatchOverrides {
            search_radius: Some(20.0),
            ..MatchOverrides::default()
        };

        let result = matcher.match_with(&trace, &narrow);
        assert!(matches!(result, Err(MatchError::NoViablePath)));

        let result = matcher.match_trace(&trace).expect("must match");
        assert_eq!(result.matched(), 2);

        // The matcher itself is unchanged.
        assert_eq!(matcher.options().search_radius, 50.0);
        assert_eq!(matcher.options().break_policy, BreakPolicy::Split);
    }

    #[test]
    fn handles_requests() {
        let matcher = matcher();

        let request: MatchRequest = serde_json::from_value(serde_json::json!({
            "points": [
                { "latitude": at(20.0, 2.0).y(), "longitude": at(20.0, 2.0).x(),
                  "timestamp": "2024-01-01T00:00:00Z" },
                { "latitude": at(90.0, -3.0).y(), "longitude": at(90.0, -3.0).x(),
                  "timestamp": "2024-01-01T00:00:10Z", "accuracy": 5.0 },
                { "latitude": at(170.0, 1.0).y(), "longitude": at(170.0, 1.0).x(),
                  "timestamp": "2024-01-01T00:00:20Z" }
            ],
            "options": { "searchRadius": 25.0 }
        }))
        .expect("request must parse");

        assert_eq!(request.options.search_radius, Some(25.0));

        let response = matcher.handle(request).expect("must match");
        assert_eq!(response.matched.len(), 3);
        assert!(response.matched.iter().all(Option::is_some));
        assert_eq!(response.routes.len(), 1);
        assert!(response.gaps.is_empty());

        let json = serde_json::to_value(&response).expect("response must serialise");
        assert!(json["matched"][0]["segmentId"].is_u64());
        assert!(json["confidence"].is_f64());
    }

    #[test]
    fn rejects_malformed_requests() {
        let matcher = matcher();

        let empty = MatchRequest {
            points: vec![],
            options: MatchOverrides::default(),
        };

        assert!(matches!(matcher.handle(empty), Err(MatchError::EmptyTrace)));

        let invalid = MatchRequest {
            points: vec![Coordinate::new_unchecked(123.0, 151.2)],
            options: MatchOverrides::default(),
        };

        assert!(matches!(
            matcher.handle(invalid),
            Err(MatchError::InvalidTrace(_))
        ));
    }
}
