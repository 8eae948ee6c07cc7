use crate::config::ConfigError;
use crate::geo::GeoError;

use std::time::Duration;
use thiserror::Error;

/// The failure of an entire match request.
///
/// Local anomalies, such as an observation without candidates or a
/// single forbidden transition, are not errors. They are recorded as
/// warnings upon the [`MatchResult`](crate::MatchResult) instead.
#[derive(Error, Debug)]
pub enum MatchError {
    #[error("no input points were given")]
    EmptyTrace,

    #[error("trace too complex: {0}")]
    TraceTooComplex(Complexity),

    #[error("no candidate sequence has a non-zero probability")]
    NoViablePath,

    #[error("invalid trace: {0}")]
    InvalidTrace(GeoError),

    #[error("invalid options: {0}")]
    InvalidOptions(#[from] ConfigError),
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Complexity {
    #[error("{points} points exceeds the limit of {limit}")]
    TooManyPoints { points: usize, limit: usize },

    #[error("exceeded the time budget of {limit:?}")]
    Timeout { limit: Duration },
}

impl MatchError {
    /// Whether the same request may succeed if retried, for example
    /// with a smaller trace or under lower load.
    pub fn is_retryable(&self) -> bool {
        matches!(self, MatchError::TraceTooComplex(_))
    }
}

impl From<GeoError> for MatchError {
    fn from(error: GeoError) -> Self {
        match error {
            GeoError::EmptyTrace => MatchError::EmptyTrace,
            error => MatchError::InvalidTrace(error),
        }
    }
}
