//! `model.safetensors.index.json` manifest

use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tensor name to shard filename mapping, in manifest order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShardIndex {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    pub weight_map: IndexMap<String, String>,
}

impl ShardIndex {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    pub fn from_weight_map<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            metadata: None,
            weight_map: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Distinct shard filenames, sorted
    pub fn shard_files(&self) -> Vec<String> {
        self.weight_map
            .values()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// `metadata.total_size` as declared by the publisher
    pub fn declared_total_size(&self) -> Option<u64> {
        self.metadata.as_ref()?.get("total_size")?.as_u64()
    }
}
