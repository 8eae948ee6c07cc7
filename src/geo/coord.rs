use crate::geo::error::GeoError;

use chrono::{DateTime, Utc};
use geo::{coord, Point};
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};

pub type Degree = f64;

/// `Coordinate`
/// A single observation within a trace. Holds the WGS84 position
/// of the observation, and optionally the time at which it was
/// recorded and the accuracy radius (in meters) reported by the device.
///
/// Coordinates are immutable once recorded; the builder-style methods
/// return a new value.
///
/// ```rust
/// use trace_matcher::Coordinate;
///
/// let coordinate = Coordinate::new(-33.8688, 151.2093)
///     .expect("valid coordinate")
///     .with_accuracy(8.0);
///
/// assert_eq!(coordinate.accuracy(), Some(8.0));
/// ```
#[derive(Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    latitude: Degree,
    longitude: Degree,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    timestamp: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    accuracy: Option<f64>,
}

impl Coordinate {
    /// Creates a coordinate from a latitude and longitude given in degrees,
    /// rejecting positions which do not lie on the globe.
    pub fn new(latitude: Degree, longitude: Degree) -> Result<Self, GeoError> {
        let coordinate = Self::new_unchecked(latitude, longitude);
        coordinate.validate()?;

        Ok(coordinate)
    }

    pub fn new_unchecked(latitude: Degree, longitude: Degree) -> Self {
        Coordinate {
            latitude,
            longitude,
            timestamp: None,
            accuracy: None,
        }
    }

    pub fn with_timestamp(self, timestamp: DateTime<Utc>) -> Self {
        Coordinate {
            timestamp: Some(timestamp),
            ..self
        }
    }

    pub fn with_accuracy(self, accuracy: f64) -> Self {
        Coordinate {
            accuracy: Some(accuracy),
            ..self
        }
    }

    /// Validates the position (and accuracy, if given) of the coordinate.
    ///
    /// Deserialized coordinates bypass [`Coordinate::new`], so this is
    /// re-run by [`Trace::new`](crate::Trace::new) for every entry.
    pub fn validate(&self) -> Result<(), GeoError> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(GeoError::InvalidCoordinate(format!(
                "Latitude must be within [-90, 90]. Given: {}",
                self.latitude
            )));
        }

        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(GeoError::InvalidCoordinate(format!(
                "Longitude must be within [-180, 180]. Given: {}",
                self.longitude
            )));
        }

        if let Some(accuracy) = self.accuracy {
            if !accuracy.is_finite() || accuracy < 0.0 {
                return Err(GeoError::InvalidCoordinate(format!(
                    "Accuracy must be a non-negative distance. Given: {}",
                    accuracy
                )));
            }
        }

        Ok(())
    }

    pub fn latitude(&self) -> Degree {
        self.latitude
    }

    pub fn longitude(&self) -> Degree {
        self.longitude
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }

    pub fn accuracy(&self) -> Option<f64> {
        self.accuracy
    }

    /// The position as a point, in `(x = lng, y = lat)` order.
    #[inline]
    pub fn point(&self) -> Point {
        Point(coord! { x: self.longitude, y: self.latitude })
    }

    /// Seconds elapsed between `self` and a later observation, `next`.
    /// Returns `None` unless both observations are timestamped.
    pub fn seconds_until(&self, next: &Coordinate) -> Option<f64> {
        let (from, to) = (self.timestamp?, next.timestamp?);
        Some((to - from).num_milliseconds() as f64 / 1000.0)
    }
}

impl From<Point> for Coordinate {
    fn from(point: Point) -> Self {
        Coordinate::new_unchecked(point.y(), point.x())
    }
}

impl From<Coordinate> for Point {
    fn from(coordinate: Coordinate) -> Self {
        coordinate.point()
    }
}

impl Debug for Coordinate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Coordinate({}, {}", self.latitude, self.longitude)?;

        if let Some(timestamp) = self.timestamp {
            write!(f, " @ {}", timestamp.to_rfc3339())?;
        }

        write!(f, ")")
    }
}

impl Display for Coordinate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}
