//! Sharded checkpoint resolution

use std::collections::HashMap;

use rayon::prelude::*;
use tracing::{debug, info};

use super::error::ResolveError;
use super::index::ShardIndex;
use crate::config::SAFETENSORS_INDEX_FILE;
use crate::fetch::{RangeFetchClient, Transport};
use crate::safetensors::{HeaderDecoder, SafetensorsHeader};

/// Index plus every shard header it references, keyed by shard filename
#[derive(Debug, Clone)]
pub struct ResolvedShards {
    pub index: ShardIndex,
    pub headers: HashMap<String, SafetensorsHeader>,
}

/// Fetches the shard index and decodes each referenced shard header
#[derive(Debug)]
pub struct ShardedIndexResolver<'a, T> {
    client: &'a RangeFetchClient<T>,
}

impl<'a, T: Transport> ShardedIndexResolver<'a, T> {
    pub fn new(client: &'a RangeFetchClient<T>) -> Self {
        Self { client }
    }

    /// Fetch and parse the index manifest. No range: it is a small file.
    pub fn fetch_index(&self, repo: &str, revision: &str) -> Result<ShardIndex, ResolveError> {
        let bytes = self
            .client
            .fetch(repo, SAFETENSORS_INDEX_FILE, revision, None)
            .map_err(ResolveError::IndexFetch)?;
        ShardIndex::from_slice(&bytes).map_err(ResolveError::IndexParse)
    }

    /// Resolve the index and decode all shard headers on a pool of
    /// `concurrency` workers. The first shard failure aborts the whole run.
    pub fn resolve(
        &self,
        repo: &str,
        revision: &str,
        concurrency: usize,
    ) -> Result<ResolvedShards, ResolveError> {
        let index = self.fetch_index(repo, revision)?;
        let shards = index.shard_files();
        info!(repo, revision, shards = shards.len(), tensors = index.weight_map.len(), "Found shard index");

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(concurrency.max(1))
            .thread_name(|i| format!("shard-fetch-{i}"))
            .build()
            .map_err(|e| ResolveError::Pool(e.to_string()))?;

        let decoder = HeaderDecoder::new(self.client);
        let headers = pool.install(|| {
            shards
                .par_iter()
                .map(|filename| {
                    decoder
                        .decode(repo, filename, revision)
                        .map(|header| (filename.clone(), header))
                        .map_err(|source| ResolveError::Shard {
                            filename: filename.clone(),
                            source,
                        })
                })
                .collect::<Result<HashMap<_, _>, _>>()
        })?;

        debug!(repo, shards = headers.len(), "Decoded all shard headers");
        Ok(ResolvedShards { index, headers })
    }
}
