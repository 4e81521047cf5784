//! Catalog construction from decoded headers

use std::collections::HashMap;

use tracing::trace;

use super::error::CatalogError;
use super::record::TensorRecord;
use crate::config::DtypePolicy;
use crate::safetensors::SafetensorsHeader;
use crate::shard::ShardIndex;

/// Turns decoded headers into ordered [`TensorRecord`]s
#[derive(Debug, Clone, Copy, Default)]
pub struct TensorCatalogBuilder {
    policy: DtypePolicy,
}

impl TensorCatalogBuilder {
    pub fn new(policy: DtypePolicy) -> Self {
        Self { policy }
    }

    /// Records in `weight_map` order. Tensors missing from their shard's
    /// header (or whose shard was never decoded) are skipped.
    pub fn build_sharded(
        &self,
        index: &ShardIndex,
        headers: &HashMap<String, SafetensorsHeader>,
    ) -> Result<Vec<TensorRecord>, CatalogError> {
        let mut records = Vec::with_capacity(index.weight_map.len());
        for (name, filename) in &index.weight_map {
            match headers.get(filename).and_then(|header| header.get(name)) {
                Some(info) => records.push(TensorRecord::new(name, info, self.policy)?),
                None => trace!(tensor = %name, shard = %filename, "Tensor not in shard header, skipping"),
            }
        }
        Ok(records)
    }

    /// Records in header order, `__metadata__` excluded
    pub fn build_single(&self, header: &SafetensorsHeader) -> Result<Vec<TensorRecord>, CatalogError> {
        header
            .tensors()
            .map(|(name, info)| TensorRecord::new(name, info, self.policy))
            .collect()
    }
}
