use crate::config::ConfigError;
use crate::geo::GeoError;
use crate::graph::GraphError;
use crate::impl_err;
use crate::transition::MatchError;

use thiserror::Error;

/// The crate-level error, wrapping the error of each submodule.
#[derive(Error, Debug)]
pub enum Error {
    #[error("geometry: {0}")]
    Geo(GeoError),

    #[error("network: {0}")]
    Graph(GraphError),

    #[error("match: {0}")]
    Match(MatchError),

    #[error("configuration: {0}")]
    Config(ConfigError),

    #[error("io: {0}")]
    Io(std::io::Error),
}

impl_err!(GeoError, Geo);
impl_err!(GraphError, Graph);
impl_err!(MatchError, Match);
impl_err!(ConfigError, Config);
impl_err!(std::io::Error, Io);

pub type Result<T> = std::result::Result<T, Error>;
