mod definition;
mod implementation;


pub use definition::{NetworkPath, Position, Route, Traversal};
