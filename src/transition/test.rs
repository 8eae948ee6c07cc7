use crate::config::{BreakPolicy, MatchOptions};
use crate::fixtures::{at, grid, islands, one_way_loop, straight_road, trace};
use crate::geo::{Coordinate, Trace};
use crate::graph::{Graph, Match, SegmentId};
use crate::transition::*;

use approx::assert_relative_eq;
use chrono::Duration;
use geo::{Distance, Haversine, Point};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn options() -> MatchOptions {
    MatchOptions {
        search_radius: 30.0,
        ..MatchOptions::default()
    }
}

fn costing() -> CostingStrategies<DefaultEmissionCost, DefaultTransitionCost> {
    CostingStrategies::default()
}

fn matched_segments(result: &MatchResult) -> Vec<Option<SegmentId>> {
    result
        .points()
        .iter()
        .map(|point| point.map(|point| point.segment_id))
        .collect()
}

#[test_log::test]
fn three_points_along_straight_road() {
    let graph = straight_road().expect("fixture must build");
    let trace = trace(
        &[at(100.0, 0.0), at(150.0, 0.0), at(200.0, 0.0)],
        Duration::seconds(10),
    )
    .expect("trace must be valid");

    let result = graph.r#match(&trace, &options()).expect("must match");

    assert_eq!(matched_segments(&result), vec![Some(SegmentId(1)); 3]);
    assert_relative_eq!(result.length(), 100.0, epsilon = 1.0);
    assert!(result.confidence() > 0.9, "confidence: {}", result.confidence());

    assert_eq!(result.pieces().count(), 1);
    assert_eq!(result.gaps().count(), 0);
    assert!(result.warnings().is_empty());
}

#[test_log::test]
fn distant_point_is_a_gap() {
    let graph = straight_road().expect("fixture must build");
    let trace = trace(
        &[at(100.0, 0.0), at(150.0, 5_000.0), at(200.0, 0.0)],
        Duration::seconds(10),
    )
    .expect("trace must be valid");

    let options = MatchOptions {
        search_radius: 50.0,
        ..MatchOptions::default()
    };

    let result = graph.r#match(&trace, &options).expect("must match");

    assert_eq!(
        matched_segments(&result),
        vec![Some(SegmentId(1)), None, Some(SegmentId(1))]
    );

    assert!(matches!(
        result.route(),
        [
            RouteElement::Path(_),
            RouteElement::Gap(GapReason::Unmatched { index: 1 }),
            RouteElement::Path(_)
        ]
    ));

    let [MatchWarning::OutOfCoverage {
        index: 1,
        nearest_distance: Some(distance),
    }] = result.warnings()
    else {
        panic!("expected a single coverage warning, got {:?}", result.warnings());
    };

    assert_relative_eq!(*distance, 5_000.0, epsilon = 5.0);
}

#[test]
fn impossible_speed_is_forbidden() {
    let graph = islands(500_000.0).expect("fixture must build");
    let trace = trace(
        &[at(500.0, 0.0), at(500.0, 500_000.0)],
        Duration::seconds(1),
    )
    .expect("trace must be valid");

    let options = MatchOptions::default();
    let transition = Transition::new(
        &graph,
        &trace,
        &options,
        CostingStrategies::from_options(&options),
    )
    .expect("transition must build");

    let layers = transition.layers();
    assert_eq!(layers.len(), 2);

    let (first, second) = (&layers.layers[0], &layers.layers[1]);
    assert!(!first.is_gap() && !second.is_gap());

    let model = transition.model();
    for source in &first.candidates {
        for target in &second.candidates {
            let edge = model.score(source, target, transition.elapsed(0, 1));
            assert!(edge.is_forbidden());
            assert_eq!(edge.probability, 0.0);
        }
    }

    for break_policy in [BreakPolicy::Split, BreakPolicy::Fail] {
        let options = MatchOptions {
            break_policy,
            ..MatchOptions::default()
        };

        assert!(matches!(
            graph.r#match(&trace, &options),
            Err(MatchError::NoViablePath)
        ));
    }
}

#[test_log::test]
fn disconnection_splits_the_route() {
    let graph = islands(2_000.0).expect("fixture must build");
    let trace = trace(
        &[at(100.0, 0.0), at(100.0, 2_000.0), at(150.0, 2_000.0)],
        Duration::seconds(100),
    )
    .expect("trace must be valid");

    let result = graph.r#match(&trace, &options()).expect("must match");

    assert_eq!(
        matched_segments(&result),
        vec![Some(SegmentId(1)), Some(SegmentId(2)), Some(SegmentId(2))]
    );

    assert!(matches!(
        result.route(),
        [
            RouteElement::Path(_),
            RouteElement::Gap(GapReason::Disconnected { from: 0, to: 1 }),
            RouteElement::Path(_)
        ]
    ));

    assert!(result
        .warnings()
        .contains(&MatchWarning::Disconnected { from: 0, to: 1 }));

    let fail = MatchOptions {
        break_policy: BreakPolicy::Fail,
        ..options()
    };

    assert!(matches!(
        graph.r#match(&trace, &fail),
        Err(MatchError::NoViablePath)
    ));
}

#[test]
fn points_on_segment_match_with_near_maximal_emission() {
    let graph = straight_road().expect("fixture must build");

    // Each vertex of the road's polyline
    let points = (0..=4).map(|i| at(i as f64 * 250.0, 0.0)).collect::<Vec<_>>();
    let trace = trace(&points, Duration::seconds(20)).expect("trace must be valid");

    let options = MatchOptions {
        search_radius: 100.0,
        ..MatchOptions::default()
    };

    let result = graph.r#match(&trace, &options).expect("must match");

    for point in result.points() {
        let point = point.expect("every point must match");

        assert_eq!(point.segment_id, SegmentId(1));
        assert!(point.emission > 0.99, "emission: {}", point.emission);
    }
}

#[test]
fn generate_is_idempotent() {
    let graph = grid(4, 100.0).expect("fixture must build");
    let costing = costing();
    let generator = LayerGenerator::new(&graph, &costing);

    let coordinate = Coordinate::from(at(130.0, 160.0));

    let first = generator.generate(&coordinate, 8, 120.0);
    let second = generator.generate(&coordinate, 8, 120.0);

    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[test]
fn generate_is_sorted_and_capped() {
    let graph = grid(3, 100.0).expect("fixture must build");
    let costing = costing();
    let generator = LayerGenerator::new(&graph, &costing);

    let coordinate = Coordinate::from(at(110.0, 95.0));
    let candidates = generator.generate(&coordinate, 3, 50.0);

    assert_eq!(candidates.len(), 3);
    assert!(candidates
        .windows(2)
        .all(|pair| pair[0].distance <= pair[1].distance));

    assert!(candidates
        .iter()
        .all(|candidate| candidate.distance <= 50.0));

    assert!(candidates
        .windows(2)
        .all(|pair| pair[0].emission >= pair[1].emission));
}

#[test]
fn larger_radius_never_yields_fewer_candidates() {
    let graph = grid(5, 100.0).expect("fixture must build");
    let costing = costing();
    let generator = LayerGenerator::new(&graph, &costing);

    let coordinate = Coordinate::from(at(215.0, 140.0));

    let counts = [5.0, 15.0, 40.0, 60.0, 90.0, 150.0, 400.0]
        .into_iter()
        .map(|radius| generator.generate(&coordinate, 8, radius).len())
        .collect::<Vec<_>>();

    assert!(counts.windows(2).all(|pair| pair[0] <= pair[1]), "{counts:?}");
}

#[test]
fn out_of_coverage_yields_no_candidates() {
    let graph = straight_road().expect("fixture must build");
    let costing = costing();
    let generator = LayerGenerator::new(&graph, &costing);

    let coordinate = Coordinate::from(at(500.0, 5_000.0));
    assert!(generator.generate(&coordinate, 8, 50.0).is_empty());
}

#[test]
fn accuracy_widens_emission() {
    let graph = straight_road().expect("fixture must build");
    let costing = costing();
    let generator = LayerGenerator::new(&graph, &costing);

    let coordinate = Coordinate::from(at(300.0, 20.0));

    let precise = generator.generate(&coordinate, 1, 50.0);
    let imprecise = generator.generate(&coordinate.with_accuracy(40.0), 1, 50.0);

    assert!(imprecise[0].emission > precise[0].emission);
}

#[test]
fn one_way_is_respected() {
    let graph = one_way_loop(200.0).expect("fixture must build");

    let forward = trace(
        &[at(20.0, 0.0), at(180.0, 0.0), at(200.0, 100.0)],
        Duration::seconds(10),
    )
    .expect("trace must be valid");

    let result = graph.r#match(&forward, &options()).expect("must match");
    let piece = result.pieces().next().expect("must have a piece");

    assert_relative_eq!(result.length(), 280.0, epsilon = 1.0);
    assert_eq!(piece.segments, vec![SegmentId(1), SegmentId(2)]);

    // Travelling against the loop must go all the way around it.
    let backward = trace(&[at(180.0, 0.0), at(20.0, 0.0)], Duration::seconds(10))
        .expect("trace must be valid");

    let result = graph.r#match(&backward, &options()).expect("must match");
    assert!(result.length() > 600.0, "length: {}", result.length());
}

#[test]
fn duplicates_share_a_match() {
    let graph = straight_road().expect("fixture must build");
    let trace = trace(
        &[at(100.0, 0.0), at(100.5, 0.0), at(101.0, 0.5), at(150.0, 0.0)],
        Duration::seconds(5),
    )
    .expect("trace must be valid");

    let result = graph.r#match(&trace, &options()).expect("must match");
    let points = result.points();

    assert_eq!(points.len(), 4);

    let kept = points[0].expect("must match");
    for folded in &points[1..3] {
        let folded = folded.expect("folded points share a match");

        assert!(folded.folded);
        assert_eq!(folded.segment_id, kept.segment_id);
        assert_eq!(folded.offset, kept.offset);
    }

    assert!(!points[3].expect("must match").folded);
}

#[test]
fn exhausted_timeout_is_retryable() {
    let graph = straight_road().expect("fixture must build");
    let trace = trace(&[at(100.0, 0.0), at(150.0, 0.0)], Duration::seconds(10))
        .expect("trace must be valid");

    let options = MatchOptions {
        timeout: std::time::Duration::ZERO,
        ..options()
    };

    let error = graph.r#match(&trace, &options).expect_err("must time out");

    assert!(matches!(
        error,
        MatchError::TraceTooComplex(Complexity::Timeout { .. })
    ));
    assert!(error.is_retryable());
}

/// Delays every transition it scores, so decoding outlasts short time budgets.
struct Sluggish {
    inner: DefaultTransitionCost,
    delay: std::time::Duration,
    calls: Arc<AtomicUsize>,
}

impl<'a> Strategy<TransitionContext<'a>> for Sluggish {
    fn calculate(&self, context: TransitionContext<'a>) -> Option<f64> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        std::thread::sleep(self.delay);

        self.inner.calculate(context)
    }
}

#[test_log::test]
fn timeout_interrupts_decoding() {
    let graph = straight_road().expect("fixture must build");
    let points = (0..30)
        .map(|i| at(10.0 + i as f64 * 30.0, 0.0))
        .collect::<Vec<_>>();

    let trace = trace(&points, Duration::seconds(3)).expect("trace must be valid");

    let options = MatchOptions {
        timeout: std::time::Duration::from_millis(100),
        ..options()
    };

    let calls = Arc::new(AtomicUsize::new(0));
    let costing = CostingStrategies::new(
        DefaultEmissionCost::default(),
        Sluggish {
            inner: DefaultTransitionCost::default(),
            delay: std::time::Duration::from_millis(10),
            calls: calls.clone(),
        },
    );

    let transition =
        Transition::new(&graph, &trace, &options, costing).expect("transition must build");

    let error = transition
        .solve(ViterbiSolver::default())
        .expect_err("must time out");

    assert!(matches!(
        error,
        MatchError::TraceTooComplex(Complexity::Timeout { limit })
            if limit == std::time::Duration::from_millis(100)
    ));

    // Decoding had begun, and was stopped before scoring every layer.
    let calls = calls.load(Ordering::Relaxed);
    assert!(calls > 0 && calls < points.len() - 1, "calls: {calls}");

    // The graph is untouched, so the same and smaller traces still match.
    let result = graph.r#match(&trace, &self::options()).expect("must match");
    assert_eq!(result.matched(), points.len());

    let small = crate::fixtures::trace(&points[..3], Duration::seconds(3))
        .expect("trace must be valid");
    assert!(graph.r#match(&small, &self::options()).is_ok());
}

#[test]
fn simultaneous_jump_is_forbidden() {
    let graph = straight_road().expect("fixture must build");
    let jump = trace(&[at(50.0, 0.0), at(950.0, 0.0)], Duration::seconds(0))
        .expect("equal timestamps are valid");

    let options = MatchOptions::default();
    let transition = Transition::new(
        &graph,
        &jump,
        &options,
        CostingStrategies::from_options(&options),
    )
    .expect("transition must build");

    let model = transition.model();
    assert_eq!(model.bound(900.0, transition.elapsed(0, 1)), 0.0);

    let (first, second) = (&transition.layers().layers[0], &transition.layers().layers[1]);
    for source in &first.candidates {
        for target in &second.candidates {
            let edge = model.score(source, target, transition.elapsed(0, 1));
            assert!(edge.is_forbidden());
        }
    }

    assert!(matches!(
        graph.r#match(&jump, &options),
        Err(MatchError::NoViablePath)
    ));

    // Without timestamps, the same positions are plausible.
    let untimed = Trace::new(vec![
        Coordinate::from(at(50.0, 0.0)),
        Coordinate::from(at(950.0, 0.0)),
    ])
    .expect("trace must be valid");

    let result = graph.r#match(&untimed, &options).expect("must match");
    assert_relative_eq!(result.length(), 900.0, epsilon = 1.0);
}

#[test]
fn oversized_trace_is_rejected() {
    let graph = straight_road().expect("fixture must build");
    let trace = trace(
        &[at(100.0, 0.0), at(150.0, 0.0), at(200.0, 0.0)],
        Duration::seconds(10),
    )
    .expect("trace must be valid");

    let options = MatchOptions {
        max_trace_points: 2,
        ..options()
    };

    assert!(matches!(
        graph.r#match(&trace, &options),
        Err(MatchError::TraceTooComplex(Complexity::TooManyPoints {
            points: 3,
            limit: 2
        }))
    ));
}

#[test]
fn invalid_options_are_rejected() {
    let graph = straight_road().expect("fixture must build");
    let trace = trace(&[at(100.0, 0.0)], Duration::seconds(10)).expect("trace must be valid");

    let options = MatchOptions {
        max_candidates: 0,
        ..options()
    };

    assert!(matches!(
        graph.r#match(&trace, &options),
        Err(MatchError::InvalidOptions(_))
    ));
}

#[test]
fn single_point_matches_alone() {
    let graph = straight_road().expect("fixture must build");
    let trace = trace(&[at(400.0, 10.0)], Duration::seconds(10)).expect("trace must be valid");

    let result = graph.r#match(&trace, &options()).expect("must match");

    assert_eq!(result.matched(), 1);
    assert_eq!(result.length(), 0.0);

    let piece = result.pieces().next().expect("must have a piece");
    assert_eq!(piece.geometry.0.len(), 1);
}

#[test]
fn simplification_reduces_vertices() {
    let graph = straight_road().expect("fixture must build");
    let trace = trace(
        &[at(100.0, 0.0), at(500.0, 0.0), at(900.0, 0.0)],
        Duration::seconds(30),
    )
    .expect("trace must be valid");

    let plain = graph.r#match(&trace, &options()).expect("must match");
    let simplified = graph
        .r#match(
            &trace,
            &MatchOptions {
                simplify_tolerance: Some(0.000001),
                ..options()
            },
        )
        .expect("must match");

    let vertices = |result: &MatchResult| {
        result
            .pieces()
            .map(|piece| piece.geometry.0.len())
            .sum::<usize>()
    };

    assert!(vertices(&simplified) < vertices(&plain));
    assert_relative_eq!(simplified.length(), plain.length());
}

#[test]
fn snaps_coordinates_onto_route() {
    let graph = straight_road().expect("fixture must build");
    let trace = trace(
        &[at(100.0, 0.0), at(150.0, 0.0), at(200.0, 0.0)],
        Duration::seconds(10),
    )
    .expect("trace must be valid");

    let result = graph.r#match(&trace, &options()).expect("must match");

    let photo = Coordinate::from(at(130.0, 12.0));
    let snapped: Point = result.snap(&photo).expect("route is not empty");

    assert!(Haversine.distance(snapped, at(130.0, 0.0)) < 1.0);
    assert_eq!(result.geometry().0.len(), 1);
}

#[test]
fn matching_is_deterministic() {
    let graph: Graph = grid(6, 100.0).expect("fixture must build");
    let points = [
        at(10.0, 3.0),
        at(60.0, -4.0),
        at(104.0, 40.0),
        at(97.0, 95.0),
        at(150.0, 103.0),
        at(230.0, 96.0),
    ];

    let trace = trace(&points, Duration::seconds(8)).expect("trace must be valid");

    let first = graph.r#match(&trace, &MatchOptions::default()).expect("must match");
    let second = graph.r#match(&trace, &MatchOptions::default()).expect("must match");

    assert_eq!(first, second);
    assert_eq!(first.matched(), points.len());
}
