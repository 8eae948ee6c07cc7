//! Costing strategies for the emission and transition
//! probabilities of the hidden markov model.

pub mod default;
pub mod emission;
pub mod transition;
pub mod util;


#[doc(inline)]
pub use default::*;
#[doc(inline)]
pub use emission::*;
#[doc(inline)]
pub use transition::*;
#[doc(inline)]
pub use util::*;
