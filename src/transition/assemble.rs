use crate::graph::{Graph, Scan};
use crate::transition::*;

use geo::{Coord, LineString, Simplify};
use log::debug;
use measure_time::debug_time;

/// Coordinates closer than this (in degrees, roughly 0.1mm) are duplicates.
const COORDINATE_EPSILON: f64 = 1e-9;

/// Stitches the decoded candidate sequence of a [`Transition`] into a route.
///
/// Consecutive chosen candidates are joined by the shortest path found between
/// them when scoring their transition, so no further routing is performed.
/// Candidates on the same segment are joined by the sub-segment between their
/// offsets. Where the trace is broken, by an unmatched observation or a
/// disconnection, the route is broken into separate pieces with a gap marker
/// between them.
pub struct RouteAssembler<'a> {
    map: &'a Graph,
    simplify_tolerance: Option<f64>,
}

impl<'a> RouteAssembler<'a> {
    pub fn new(map: &'a Graph) -> Self {
        RouteAssembler {
            map,
            simplify_tolerance: None,
        }
    }

    /// Simplifies the geometry of each piece using Douglas-Peucker, with the given tolerance (degrees).
    pub fn simplify(self, tolerance: Option<f64>) -> Self {
        RouteAssembler {
            simplify_tolerance: tolerance,
            ..self
        }
    }

    fn piece(&self, steps: &[Step]) -> Option<RoutePiece> {
        let (first, last) = (steps.first()?, steps.last()?);

        let mut coordinates: Vec<Coord> = vec![first.candidate.position.0];
        let mut segments = vec![first.candidate.segment];
        let mut length = 0.0;

        for step in &steps[1..] {
            if let Some(path) = step.transition.as_ref().and_then(|edge| edge.path.as_ref()) {
                coordinates.extend(path.coordinates(self.map));
                segments.extend(path.segments());
                length += path.length;
            }

            coordinates.push(step.candidate.position.0);
            segments.push(step.candidate.segment);
        }

        coordinates.dedup_by(|a, b| {
            (a.x - b.x).abs() < COORDINATE_EPSILON && (a.y - b.y).abs() < COORDINATE_EPSILON
        });
        segments.dedup();

        let mut geometry = LineString::new(coordinates);
        if let Some(tolerance) = self.simplify_tolerance {
            geometry = geometry.simplify(&tolerance);
        }

        Some(RoutePiece {
            start: first.index,
            end: last.index,
            geometry,
            length,
            segments,
        })
    }

    pub fn assemble<E, T>(&self, transition: &Transition<E, T>, collapse: Collapse) -> MatchResult
    where
        E: EmissionStrategy,
        T: TransitionStrategy,
    {
        debug_time!("route assembly");
        let trace = transition.trace();

        // One slot per observation, where folded observations share
        // the match of the observation they were folded into.
        let mut points: Vec<Option<MatchedPoint>> = vec![None; trace.len()];
        for step in collapse.steps() {
            if let Some(slot) = points.get_mut(step.index) {
                *slot = Some(MatchedPoint::from(&step.candidate));
            }
        }

        for (index, representative) in transition.representatives.iter().enumerate() {
            if index != *representative {
                points[index] = points[*representative].map(MatchedPoint::folded);
            }
        }

        let unmatched = |range: std::ops::Range<usize>| {
            range
                .filter(|index| points[*index].is_none())
                .map(|index| RouteElement::Gap(GapReason::Unmatched { index }))
                .collect::<Vec<_>>()
        };

        let mut route = vec![];
        let mut cursor = 0;

        for piece in collapse.pieces.iter().filter_map(|steps| self.piece(steps)) {
            let gaps = unmatched(cursor..piece.start);

            // Consecutive pieces with no unmatched observation
            // between them were split by a disconnection.
            if gaps.is_empty() && !route.is_empty() {
                route.push(RouteElement::Gap(GapReason::Disconnected {
                    from: cursor.saturating_sub(1),
                    to: piece.start,
                }));
            }

            route.extend(gaps);
            cursor = piece.end + 1;
            route.push(RouteElement::Path(piece));
        }

        route.extend(unmatched(cursor..trace.len()));

        let mut warnings = points
            .iter()
            .enumerate()
            .filter(|(_, point)| point.is_none())
            .map(|(index, _)| MatchWarning::OutOfCoverage {
                index,
                nearest_distance: self
                    .map
                    .nearest(&trace[index].point())
                    .map(|(projection, _)| projection.distance),
            })
            .collect::<Vec<_>>();

        warnings.extend(
            collapse
                .disconnections
                .iter()
                .map(|(from, to)| MatchWarning::Disconnected {
                    from: *from,
                    to: *to,
                }),
        );

        let matched = points.iter().flatten().count();
        let confidence = match trace.len() {
            0 => 0.0,
            total => collapse.mean_probability() * matched as f64 / total as f64,
        };

        debug!(
            "Assembled {} elements, matched {matched} of {} observations (confidence={confidence:.3})",
            route.len(),
            trace.len()
        );

        MatchResult {
            points,
            route,
            confidence: confidence.clamp(0.0, 1.0),
            warnings,
        }
    }
}
