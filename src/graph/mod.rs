//! The road network.
//!
//! A [`Graph`] owns every [`RoadSegment`] of the network, the directed
//! connectivity between them, and an [R-tree](rstar::RTree) over their
//! geometry. It is built once (see [`Graph::from_segments`] and
//! [`Graph::from_file`]) and is immutable afterward, so a single instance
//! can be shared by reference across any number of concurrent match requests.
//!
//! Behaviour is exposed through the traits:
//! - [`Scan`]: the spatial index, finding segments near a position.
//! - [`Route`]: bounded shortest paths between on-network positions.
//! - [`Match`]: map-matching of an entire [`Trace`](crate::Trace).

pub mod error;
pub mod impls;
pub mod item;
pub mod primitives;
pub mod segment;
pub mod traits;


#[doc(inline)]
pub use error::GraphError;
#[doc(inline)]
pub use impls::ingest::{NetworkData, SegmentData};
#[doc(inline)]
pub use item::{Graph, GraphStructure};
#[doc(inline)]
pub use segment::{NodeId, Projection, RoadSegment, SegmentId, WayId};
#[doc(inline)]
pub use traits::*;
