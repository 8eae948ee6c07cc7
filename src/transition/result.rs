use crate::geo::Coordinate;
use crate::graph::SegmentId;
use crate::transition::Candidate;

use geo::{Closest, ClosestPoint, LineString, MultiLineString, Point};
use serde::Serialize;

/// The snapped position of a single observation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub segment_id: SegmentId,

    /// Distance (meters) along the segment.
    pub offset: f64,

    /// Distance (meters) between the observation and its snapped position.
    pub distance: f64,

    pub emission: f64,

    /// Whether the observation was folded into its predecessor,
    /// and shares its match.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub folded: bool,
}

impl MatchedPoint {
    /// The snapped position as a point, in `(x = lng, y = lat)` order.
    pub fn point(&self) -> Point {
        Point::new(self.longitude, self.latitude)
    }

    pub(crate) fn folded(self) -> Self {
        MatchedPoint {
            folded: true,
            ..self
        }
    }
}

impl From<&Candidate> for MatchedPoint {
    fn from(candidate: &Candidate) -> Self {
        MatchedPoint {
            latitude: candidate.position.y(),
            longitude: candidate.position.x(),
            segment_id: candidate.segment,
            offset: candidate.offset,
            distance: candidate.distance,
            emission: candidate.emission,
            folded: false,
        }
    }
}

/// A continuous portion of the matched route.
#[derive(Clone, Debug, PartialEq)]
pub struct RoutePiece {
    /// Index of the first observation matched by the piece.
    pub start: usize,

    /// Index of the last observation matched by the piece.
    pub end: usize,

    /// The polyline travelled, from the first matched position to the last.
    /// A piece matching a single observation holds only that position.
    pub geometry: LineString,

    /// The length (meters) travelled along the network.
    pub length: f64,

    /// The segments travelled, in order, without consecutive repeats.
    pub segments: Vec<SegmentId>,
}

/// Why the route is broken between two pieces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "camelCase")]
pub enum GapReason {
    /// The observation at `index` had no candidates within the search radius.
    Unmatched { index: usize },

    /// No route connects the observations at `from` and `to`.
    Disconnected { from: usize, to: usize },
}

#[derive(Clone, Debug, PartialEq)]
pub enum RouteElement {
    Path(RoutePiece),
    Gap(GapReason),
}

/// Local anomalies absorbed into the result.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum MatchWarning {
    /// The observation at `index` lies outside the covered network.
    OutOfCoverage {
        index: usize,

        /// The distance (meters) to the nearest segment of the network, if any exists.
        #[serde(rename = "nearestDistance")]
        nearest_distance: Option<f64>,
    },

    /// Every transition between the observations at `from` and `to` was forbidden.
    Disconnected { from: usize, to: usize },
}

/// The outcome of matching a trace.
///
/// Holds exactly one slot per observation of the trace, where
/// observations which could not be matched hold `None`, alongside the
/// assembled route: a sequence of [`RoutePiece`]s separated by gap markers.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchResult {
    pub(crate) points: Vec<Option<MatchedPoint>>,
    pub(crate) route: Vec<RouteElement>,
    pub(crate) confidence: f64,
    pub(crate) warnings: Vec<MatchWarning>,
}

impl MatchResult {
    pub fn points(&self) -> &[Option<MatchedPoint>] {
        &self.points
    }

    pub fn route(&self) -> &[RouteElement] {
        &self.route
    }

    /// The overall confidence of the match, in `[0, 1]`.
    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn warnings(&self) -> &[MatchWarning] {
        &self.warnings
    }

    /// The pieces of the route, each to be treated as an independent route.
    pub fn pieces(&self) -> impl Iterator<Item = &RoutePiece> {
        self.route.iter().filter_map(|element| match element {
            RouteElement::Path(piece) => Some(piece),
            RouteElement::Gap(_) => None,
        })
    }

    pub fn gaps(&self) -> impl Iterator<Item = &GapReason> {
        self.route.iter().filter_map(|element| match element {
            RouteElement::Gap(reason) => Some(reason),
            RouteElement::Path(_) => None,
        })
    }

    /// The number of observations which were matched.
    pub fn matched(&self) -> usize {
        self.points.iter().flatten().count()
    }

    /// The total length (meters) travelled along the network, across every piece.
    pub fn length(&self) -> f64 {
        self.pieces().map(|piece| piece.length).sum()
    }

    /// The route as a single geometry, with one line per piece.
    pub fn geometry(&self) -> MultiLineString {
        self.pieces()
            .map(|piece| piece.geometry.clone())
            .collect::<MultiLineString>()
    }

    /// Snaps an arbitrary coordinate, such as the location of a photo taken
    /// during the trip, onto the closest position of the matched route.
    pub fn snap(&self, coordinate: &Coordinate) -> Option<Point> {
        match self.geometry().closest_point(&coordinate.point()) {
            Closest::Intersection(point) | Closest::SinglePoint(point) => Some(point),
            Closest::Indeterminate => None,
        }
    }
}
