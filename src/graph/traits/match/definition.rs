use crate::config::MatchOptions;
use crate::geo::Trace;
use crate::transition::{MatchError, MatchResult};

pub trait Match {
    /// Matches a given [trace](Trace) against the map.
    ///
    /// Matching involves the use of a hidden markov model
    /// using the [`Transition`](crate::transition::Transition) module
    /// to collapse the given input onto the map, finding
    /// appropriate matching for each input value.
    fn r#match(&self, trace: &Trace, options: &MatchOptions) -> Result<MatchResult, MatchError>;
}
