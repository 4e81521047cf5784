//! Safetensors header model

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::error::DecodeError;

/// Reserved header key holding free-form string metadata
pub const METADATA_KEY: &str = "__metadata__";

/// Size of the little-endian header length prefix
pub const HEADER_PREFIX_LEN: u64 = 8;

/// One tensor entry of a safetensors header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TensorInfo {
    pub dtype: String,
    pub shape: Vec<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_offsets: Option<[u64; 2]>,
}

impl TensorInfo {
    pub fn new(dtype: impl Into<String>, shape: Vec<u64>) -> Self {
        Self {
            dtype: dtype.into(),
            shape,
            data_offsets: None,
        }
    }
}

/// Decoded header of one safetensors file, in on-disk entry order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SafetensorsHeader {
    tensors: IndexMap<String, TensorInfo>,
    metadata: Option<IndexMap<String, String>>,
}

impl SafetensorsHeader {
    /// Parse the JSON header text
    pub fn from_slice(bytes: &[u8]) -> Result<Self, DecodeError> {
        let entries: IndexMap<String, Value> =
            serde_json::from_slice(bytes).map_err(DecodeError::InvalidHeader)?;

        let mut header = Self::default();
        for (name, value) in entries {
            if name == METADATA_KEY {
                match serde_json::from_value(value) {
                    Ok(metadata) => header.metadata = Some(metadata),
                    Err(e) => debug!(error = %e, "Ignoring non-string header metadata"),
                }
                continue;
            }
            let info: TensorInfo =
                serde_json::from_value(value).map_err(DecodeError::InvalidHeader)?;
            header.tensors.insert(name, info);
        }

        Ok(header)
    }

    pub fn from_tensors<I, S>(tensors: I) -> Self
    where
        I: IntoIterator<Item = (S, TensorInfo)>,
        S: Into<String>,
    {
        Self {
            tensors: tensors.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            metadata: None,
        }
    }

    pub fn get(&self, name: &str) -> Option<&TensorInfo> {
        self.tensors.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tensors.contains_key(name)
    }

    /// Tensor entries in header order, metadata excluded
    pub fn tensors(&self) -> impl Iterator<Item = (&str, &TensorInfo)> {
        self.tensors.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.tensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tensors.is_empty()
    }

    pub fn metadata(&self) -> Option<&IndexMap<String, String>> {
        self.metadata.as_ref()
    }
}

/// Read the little-endian u64 header length from the first 8 bytes
pub fn read_header_length(bytes: &[u8]) -> Result<u64, DecodeError> {
    if (bytes.len() as u64) < HEADER_PREFIX_LEN {
        return Err(DecodeError::UnexpectedEof {
            expected: HEADER_PREFIX_LEN,
            got: bytes.len() as u64,
        });
    }
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[..8]);
    Ok(u64::from_le_bytes(buf))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_header_keeps_order() {
        let json = br#"{
            "z.weight": {"dtype": "F32", "shape": [2, 3], "data_offsets": [0, 24]},
            "__metadata__": {"format": "pt"},
            "a.bias": {"dtype": "BF16", "shape": [3], "data_offsets": [24, 30]}
        }"#;
        let header = SafetensorsHeader::from_slice(json).unwrap();
        let names: Vec<_> = header.tensors().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["z.weight", "a.bias"]);
        assert_eq!(header.metadata().unwrap()["format"], "pt");
        assert_eq!(header.get("z.weight").unwrap().data_offsets, Some([0, 24]));
    }

    #[test]
    fn test_invalid_json() {
        let result = SafetensorsHeader::from_slice(b"{not json");
        assert!(matches!(result, Err(DecodeError::InvalidHeader(_))));
    }

    #[test]
    fn test_negative_dim_rejected() {
        let result = SafetensorsHeader::from_slice(br#"{"t": {"dtype": "F32", "shape": [-1]}}"#);
        assert!(matches!(result, Err(DecodeError::InvalidHeader(_))));
    }

    #[test]
    fn test_non_string_metadata_ignored() {
        let header = SafetensorsHeader::from_slice(
            br#"{"__metadata__": {"step": 3}, "t": {"dtype": "U8", "shape": []}}"#,
        )
        .unwrap();
        assert!(header.metadata().is_none());
        assert_eq!(header.len(), 1);
    }

    #[test]
    fn test_read_header_length() {
        assert_eq!(read_header_length(&42u64.to_le_bytes()).unwrap(), 42);
        assert!(matches!(
            read_header_length(&[1, 2, 3]),
            Err(DecodeError::UnexpectedEof { expected: 8, got: 3 })
        ));
    }
}
