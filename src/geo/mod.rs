//! Observation primitives: the [`Coordinate`] recorded by a GPS device,
//! and the temporally ordered [`Trace`] of them handed to the matcher.
//!
//! Positions are converted into [`geo::Point`]s in `(x = lng, y = lat)`
//! order at the boundary, and all distances are in meters on the
//! haversine (great-circle) model.

pub mod coord;
pub mod error;
pub mod trace;

#[cfg(test)]
mod test;

#[doc(inline)]
pub use coord::{Coordinate, Degree};
#[doc(inline)]
pub use error::GeoError;
#[doc(inline)]
pub use trace::Trace;
