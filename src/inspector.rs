//! Model inspection: sharded resolution with single-file fallback

use tracing::{info, warn};

use crate::catalog::{CatalogSource, TensorCatalog, TensorCatalogBuilder};
use crate::config::{FallbackPolicy, InspectConfig, SAFETENSORS_FILE};
use crate::fetch::{FetchError, HttpTransport, RangeFetchClient, Transport};
use crate::safetensors::HeaderDecoder;
use crate::shard::ShardedIndexResolver;
use crate::{Error, Result};

enum State {
    TrySharded,
    FallbackSingleFile,
    Done(TensorCatalog),
    Failed(Error),
}

/// Produces the tensor catalog of a remote safetensors checkpoint
///
/// The sharded layout (`model.safetensors.index.json`) is tried first. When
/// it fails and the [`FallbackPolicy`] allows it, `model.safetensors` is
/// decoded instead. If the fallback fails too, its error is returned and the
/// sharded error is dropped.
#[derive(Debug)]
pub struct ModelInspector<T = HttpTransport> {
    client: RangeFetchClient<T>,
    config: InspectConfig,
}

impl ModelInspector<HttpTransport> {
    pub fn new(config: InspectConfig) -> std::result::Result<Self, FetchError> {
        let client = RangeFetchClient::from_config(&config)?;
        Ok(Self { client, config })
    }
}

impl<T: Transport> ModelInspector<T> {
    /// Create an inspector around an existing client
    pub fn with_client(client: RangeFetchClient<T>, config: InspectConfig) -> Self {
        Self { client, config }
    }

    pub fn client(&self) -> &RangeFetchClient<T> {
        &self.client
    }

    pub fn config(&self) -> &InspectConfig {
        &self.config
    }

    pub fn inspect(&self, repo: &str) -> Result<TensorCatalog> {
        let mut state = State::TrySharded;
        loop {
            state = match state {
                State::TrySharded => match self.inspect_sharded(repo) {
                    Ok(catalog) => State::Done(catalog),
                    Err(e) if self.should_fall_back(&e) => {
                        warn!(repo, error = %e, "Sharded resolution failed, trying {}", SAFETENSORS_FILE);
                        State::FallbackSingleFile
                    }
                    Err(e) => State::Failed(e),
                },
                State::FallbackSingleFile => match self.inspect_single_file(repo) {
                    Ok(catalog) => State::Done(catalog),
                    Err(e) => State::Failed(e),
                },
                State::Done(catalog) => {
                    info!(
                        repo,
                        tensors = catalog.len(),
                        total_bytes = catalog.total_bytes(),
                        "Inspection complete"
                    );
                    return Ok(catalog);
                }
                State::Failed(e) => return Err(e),
            };
        }
    }

    /// Catalog from the index manifest and its shard headers
    pub fn inspect_sharded(&self, repo: &str) -> Result<TensorCatalog> {
        let resolved = ShardedIndexResolver::new(&self.client).resolve(
            repo,
            &self.config.revision,
            self.config.concurrency(),
        )?;
        let records = TensorCatalogBuilder::new(self.config.dtype_policy)
            .build_sharded(&resolved.index, &resolved.headers)?;
        Ok(TensorCatalog::new(
            records,
            CatalogSource::Sharded {
                shards: resolved.index.shard_files(),
            },
        ))
    }

    /// Catalog from the canonical single-file checkpoint
    pub fn inspect_single_file(&self, repo: &str) -> Result<TensorCatalog> {
        let header = HeaderDecoder::new(&self.client).decode(
            repo,
            SAFETENSORS_FILE,
            &self.config.revision,
        )?;
        let records = TensorCatalogBuilder::new(self.config.dtype_policy).build_single(&header)?;
        Ok(TensorCatalog::new(records, CatalogSource::SingleFile)
            .with_metadata(header.metadata().cloned()))
    }

    fn should_fall_back(&self, error: &Error) -> bool {
        match self.config.fallback {
            FallbackPolicy::AnyError => true,
            FallbackPolicy::IndexNotFound => {
                matches!(error, Error::Resolve(e) if e.is_index_not_found())
            }
        }
    }
}
