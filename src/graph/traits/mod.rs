mod r#match;
mod proximity;
mod route;

pub use r#match::Match;
pub use proximity::Scan;
pub use route::{NetworkPath, Position, Route, Traversal};
