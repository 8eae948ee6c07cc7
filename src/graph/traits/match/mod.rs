mod definition;
mod implementation;

pub use definition::Match;
