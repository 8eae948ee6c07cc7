use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeoError {
    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(String),

    #[error("trace contains no coordinates")]
    EmptyTrace,

    #[error("timestamp at index {index} precedes the timestamp before it")]
    TimestampOutOfOrder { index: usize },
}
