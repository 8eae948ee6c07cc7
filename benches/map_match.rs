use criterion::{criterion_group, criterion_main};
use trace_matcher::fixtures::{at, grid, trace};
use trace_matcher::graph::Match;
use trace_matcher::MatchOptions;

use chrono::Duration;
use geo::Point;

struct MapMatchScenario {
    name: &'static str,
    grid_size: usize,
    spacing: f64,
    points: usize,
}

const MATCH_CASES: [MapMatchScenario; 2] = [
    MapMatchScenario {
        name: "GRID_SMALL",
        grid_size: 10,
        spacing: 100.0,
        points: 50,
    },
    MapMatchScenario {
        name: "GRID_LARGE",
        grid_size: 40,
        spacing: 80.0,
        points: 400,
    },
];

/// A staircase through the grid, alternating east and north legs,
/// observed every 25m with a small perpendicular offset.
fn staircase(scenario: &MapMatchScenario) -> Vec<Point> {
    let leg = scenario.spacing * 2.0;
    let extent = scenario.spacing * (scenario.grid_size - 1) as f64;

    (0..scenario.points)
        .map(|i| {
            let travelled = (i as f64 * 25.0) % (extent * 2.0);
            let step = (travelled / leg).floor();
            let within = travelled - step * leg;

            let (east, north) = match step as usize % 2 {
                0 => ((step / 2.0) * leg + within, (step / 2.0) * leg),
                _ => (((step + 1.0) / 2.0) * leg, ((step - 1.0) / 2.0) * leg + within),
            };

            at(east.min(extent), north.min(extent) + 4.0)
        })
        .collect()
}

fn target_benchmark(c: &mut criterion::Criterion) {
    let mut group = c.benchmark_group("match");
    group.significance_level(0.1).sample_size(30);

    MATCH_CASES.into_iter().for_each(|sc| {
        let graph = grid(sc.grid_size, sc.spacing).expect("Graph must be created");
        let trace = trace(&staircase(&sc), Duration::seconds(3)).expect("Trace must be valid");
        let options = MatchOptions::default();

        group.bench_function(format!("match: {}", sc.name), |b| {
            b.iter(|| {
                let result = graph
                    .r#match(&trace, &options)
                    .expect("Match must complete successfully");

                assert_eq!(result.points().len(), sc.points);
            })
        });
    });

    group.finish();
}

criterion_group!(targeted_benches, target_benchmark);
criterion_main!(targeted_benches);
