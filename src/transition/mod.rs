//! A Hidden-Markov-Model (HMM) matching
//! transition module that allows for
//! matching raw traces to an underlying
//! network.
//!
//! Data flows through the module as follows:
//! 1. The [`LayerGenerator`] produces a layer of [`Candidate`]s per observation.
//! 2. The [`Solver`] decodes the most likely candidate sequence, scoring
//!    moves between layers with the [`TransitionModel`].
//! 3. The [`RouteAssembler`] stitches the sequence into a [`MatchResult`].

pub mod assemble;
pub mod candidate;
pub mod costing;
pub mod graph;
pub mod layer;
pub mod model;
pub mod primitives;
pub mod result;
pub mod solver;

#[cfg(test)]
mod test;

// Re-Exports
#[doc(inline)]
pub use candidate::*;
#[doc(inline)]
pub use costing::*;
#[doc(inline)]
pub use primitives::*;
#[doc(inline)]
pub use solver::*;

pub use assemble::*;
pub use graph::*;
pub use layer::*;
pub use model::*;
pub use result::*;
