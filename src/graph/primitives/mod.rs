pub mod dijkstra;

#[doc(inline)]
pub use dijkstra::*;
