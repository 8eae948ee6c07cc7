use crate::geo::coord::Coordinate;
use crate::geo::error::GeoError;

use geo::{LineString, Point};
use serde::Serialize;
use std::ops::Deref;

/// An ordered, non-empty sequence of [`Coordinate`]s, where insertion
/// order is temporal order.
///
/// A trace can only be constructed through [`Trace::new`] (or the
/// equivalent `TryFrom` conversions), which guarantees:
///
/// - At least one coordinate is present.
/// - Every coordinate is a valid position on the globe.
/// - Consecutive timestamps, where both are present, never decrease.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Trace {
    coordinates: Vec<Coordinate>,
}

impl Trace {
    pub fn new(coordinates: Vec<Coordinate>) -> Result<Self, GeoError> {
        if coordinates.is_empty() {
            return Err(GeoError::EmptyTrace);
        }

        for coordinate in &coordinates {
            coordinate.validate()?;
        }

        // Untimed observations do not break the ordering, so we compare
        // each timestamp with the latest one seen so far.
        let mut latest = None;
        for (index, coordinate) in coordinates.iter().enumerate() {
            if let Some(timestamp) = coordinate.timestamp() {
                if latest.is_some_and(|latest| timestamp < latest) {
                    return Err(GeoError::TimestampOutOfOrder { index });
                }

                latest = Some(timestamp);
            }
        }

        Ok(Trace { coordinates })
    }

    pub fn coordinates(&self) -> &[Coordinate] {
        &self.coordinates
    }

    /// Iterates over the positions of the trace as points.
    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        self.coordinates.iter().map(Coordinate::point)
    }

    pub fn linestring(&self) -> LineString {
        self.points().collect::<LineString>()
    }

    /// Seconds elapsed between the observation at `index - 1` and `index`.
    /// Returns `None` for the first observation, or if either observation
    /// is untimed.
    pub fn elapsed(&self, index: usize) -> Option<f64> {
        let previous = self.coordinates.get(index.checked_sub(1)?)?;
        let current = self.coordinates.get(index)?;

        previous.seconds_until(current)
    }
}

impl Deref for Trace {
    type Target = [Coordinate];

    fn deref(&self) -> &Self::Target {
        &self.coordinates
    }
}

impl TryFrom<Vec<Coordinate>> for Trace {
    type Error = GeoError;

    fn try_from(coordinates: Vec<Coordinate>) -> Result<Self, Self::Error> {
        Trace::new(coordinates)
    }
}

impl TryFrom<LineString> for Trace {
    type Error = GeoError;

    /// Converts an untimed linestring, in `(x = lng, y = lat)` order.
    fn try_from(linestring: LineString) -> Result<Self, Self::Error> {
        Trace::new(
            linestring
                .into_points()
                .into_iter()
                .map(Coordinate::from)
                .collect(),
        )
    }
}
