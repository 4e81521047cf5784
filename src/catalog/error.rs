#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Unknown dtype {dtype:?} for tensor {tensor}")]
    UnknownDtype { tensor: String, dtype: String },
    #[error("Size of tensor {tensor} overflows u64")]
    SizeOverflow { tensor: String },
}
