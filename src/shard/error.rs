use crate::fetch::FetchError;
use crate::safetensors::DecodeError;

#[derive(thiserror::Error, Debug)]
pub enum ResolveError {
    #[error("Failed to fetch shard index: {0}")]
    IndexFetch(#[source] FetchError),
    #[error("Invalid shard index: {0}")]
    IndexParse(#[source] serde_json::Error),
    #[error("Failed to decode shard {filename}: {source}")]
    Shard {
        filename: String,
        #[source]
        source: DecodeError,
    },
    #[error("Failed to build shard worker pool: {0}")]
    Pool(String),
}

impl ResolveError {
    /// True when the index manifest itself does not exist (HTTP 404)
    pub fn is_index_not_found(&self) -> bool {
        matches!(self, Self::IndexFetch(e) if e.is_not_found())
    }
}
