//! model-inspect: tensor layouts of remote safetensors checkpoints
//!
//! Only the binary headers are fetched, via HTTP range requests, so even
//! multi-gigabyte sharded checkpoints are inspected in a handful of
//! kilobytes of traffic.

pub mod catalog;
pub mod config;
pub mod fetch;
pub mod inspector;
pub mod repo;
pub mod safetensors;
pub mod shard;

pub use catalog::{DType, TensorCatalog, TensorCatalogBuilder, TensorRecord};
pub use config::{DtypePolicy, FallbackPolicy, InspectConfig};
pub use fetch::{HttpTransport, RangeFetchClient, Transport};
pub use inspector::ModelInspector;
pub use safetensors::{HeaderDecoder, SafetensorsHeader};
pub use shard::{ShardIndex, ShardedIndexResolver};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Fetch error: {0}")]
    Fetch(#[from] fetch::FetchError),
    #[error("Header error: {0}")]
    Decode(#[from] safetensors::DecodeError),
    #[error("Shard resolution error: {0}")]
    Resolve(#[from] shard::ResolveError),
    #[error("Catalog error: {0}")]
    Catalog(#[from] catalog::CatalogError),
    #[error("Repository error: {0}")]
    Repo(#[from] repo::RepoError),
}

pub type Result<T> = std::result::Result<T, Error>;
