use crate::graph::SegmentId;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("could not read network dataset: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not parse network dataset: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("segment {id} is invalid: {reason}")]
    InvalidSegment { id: SegmentId, reason: String },

    #[error("segment {0} was supplied more than once")]
    DuplicateSegment(SegmentId),
}
