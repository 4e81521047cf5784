//! Tensor records and the aggregated catalog

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::Serialize;

use super::dtype::{byte_width, UNKNOWN_DTYPE_WIDTH};
use super::error::CatalogError;
use crate::config::DtypePolicy;
use crate::safetensors::TensorInfo;

/// Name, shape, dtype and byte size of one tensor
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TensorRecord {
    name: String,
    shape: Vec<u64>,
    dtype: String,
    size_bytes: u64,
}

impl TensorRecord {
    /// Build a record, sizing it as `product(shape) * byte_width(dtype)`
    pub fn new(name: &str, info: &TensorInfo, policy: DtypePolicy) -> Result<Self, CatalogError> {
        let width = match (byte_width(&info.dtype), policy) {
            (Some(width), _) => width,
            (None, DtypePolicy::Lenient) => UNKNOWN_DTYPE_WIDTH,
            (None, DtypePolicy::Strict) => {
                return Err(CatalogError::UnknownDtype {
                    tensor: name.to_string(),
                    dtype: info.dtype.clone(),
                });
            }
        };

        let size_bytes = element_count(&info.shape)
            .and_then(|n| n.checked_mul(width))
            .ok_or_else(|| CatalogError::SizeOverflow {
                tensor: name.to_string(),
            })?;

        Ok(Self {
            name: name.to_string(),
            shape: info.shape.clone(),
            dtype: info.dtype.clone(),
            size_bytes,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shape(&self) -> &[u64] {
        &self.shape
    }

    pub fn dtype(&self) -> &str {
        &self.dtype
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// Number of elements; a scalar (empty shape) has one
    pub fn num_elements(&self) -> u64 {
        element_count(&self.shape).unwrap_or(u64::MAX)
    }
}

/// Product of all dimensions, `None` on overflow
pub fn element_count(shape: &[u64]) -> Option<u64> {
    shape.iter().try_fold(1u64, |acc, &dim| acc.checked_mul(dim))
}

/// Where a catalog's records came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogSource {
    /// Built from an index manifest and the listed shard files
    Sharded { shards: Vec<String> },
    /// Built from the canonical single-file checkpoint
    SingleFile,
}

/// Per-dtype totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DtypeSummary {
    pub tensors: usize,
    pub bytes: u64,
}

/// Ordered tensor records of one model, with aggregates
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TensorCatalog {
    pub records: Vec<TensorRecord>,
    pub source: CatalogSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<IndexMap<String, String>>,
}

impl TensorCatalog {
    pub fn new(records: Vec<TensorRecord>, source: CatalogSource) -> Self {
        Self {
            records,
            source,
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: Option<IndexMap<String, String>>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TensorRecord> {
        self.records.iter()
    }

    /// Sum of all record sizes (saturating)
    pub fn total_bytes(&self) -> u64 {
        self.records
            .iter()
            .fold(0u64, |acc, r| acc.saturating_add(r.size_bytes))
    }

    /// Sum of all element counts (saturating)
    pub fn total_elements(&self) -> u64 {
        self.records
            .iter()
            .fold(0u64, |acc, r| acc.saturating_add(r.num_elements()))
    }

    /// Tensor count and bytes per dtype tag, sorted by tag
    pub fn dtype_breakdown(&self) -> BTreeMap<String, DtypeSummary> {
        let mut breakdown: BTreeMap<String, DtypeSummary> = BTreeMap::new();
        for record in &self.records {
            let entry = breakdown.entry(record.dtype.clone()).or_default();
            entry.tensors += 1;
            entry.bytes = entry.bytes.saturating_add(record.size_bytes);
        }
        breakdown
    }
}

impl<'a> IntoIterator for &'a TensorCatalog {
    type Item = &'a TensorRecord;
    type IntoIter = std::slice::Iter<'a, TensorRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, dtype: &str, shape: Vec<u64>) -> TensorRecord {
        TensorRecord::new(name, &TensorInfo::new(dtype, shape), DtypePolicy::Lenient).unwrap()
    }

    #[test]
    fn test_catalog_totals() {
        let catalog = TensorCatalog::new(
            vec![
                record("embed", "BF16", vec![1000, 64]),
                record("norm", "F32", vec![64]),
                record("step", "I64", vec![]),
                record("q", "Q4_K", vec![8, 8]),
            ],
            CatalogSource::SingleFile,
        );
        assert_eq!(catalog.total_elements(), 64_000 + 64 + 1 + 64);
        assert_eq!(catalog.total_bytes(), 128_000 + 256 + 8 + 64);

        let breakdown = catalog.dtype_breakdown();
        assert_eq!(breakdown["BF16"], DtypeSummary { tensors: 1, bytes: 128_000 });
        assert_eq!(breakdown["Q4_K"].bytes, 64);
    }

    #[test]
    fn test_empty_catalog() {
        let catalog = TensorCatalog::new(Vec::new(), CatalogSource::SingleFile);
        assert!(catalog.is_empty());
        assert_eq!(catalog.total_elements(), 0);
        assert_eq!(catalog.total_bytes(), 0);
    }
}
