//! Candidates are the hypothesised on-network positions of a single
//! observation, one per nearby segment.

pub mod collapse;
pub mod entry;

#[doc(inline)]
pub use collapse::*;
#[doc(inline)]
pub use entry::*;
