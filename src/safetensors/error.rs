use crate::fetch::FetchError;

#[derive(thiserror::Error, Debug)]
pub enum DecodeError {
    #[error("Header too large: {length} bytes exceeds the {limit} byte limit")]
    HeaderTooLarge { length: u64, limit: u64 },
    #[error("Invalid JSON header: {0}")]
    InvalidHeader(#[source] serde_json::Error),
    #[error("Unexpected end of data: expected {expected} bytes, got {got}")]
    UnexpectedEof { expected: u64, got: u64 },
    #[error(transparent)]
    Fetch(#[from] FetchError),
}
