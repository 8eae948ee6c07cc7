pub mod generator;

#[doc(inline)]
pub use generator::*;
