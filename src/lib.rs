#![doc = include_str!("../readme.md")]

pub mod api;
pub mod config;
pub mod error;
#[cfg(any(test, feature = "fixtures"))]
#[doc(hidden)]
pub mod fixtures;
pub mod geo;
pub mod graph;
pub mod matcher;
pub mod transition;
pub mod util;

#[doc(inline)]
pub use config::{BreakPolicy, MatchOptions, MatchOverrides};
#[doc(inline)]
pub use error::{Error, Result};
#[doc(inline)]
pub use crate::geo::{Coordinate, Trace};
#[doc(inline)]
pub use graph::{Graph, RoadSegment, Route, Scan, SegmentId};
#[doc(inline)]
pub use matcher::Matcher;
#[doc(inline)]
pub use transition::{Candidate, MatchError, MatchResult};
