//! Tensor catalogs: sized records built from decoded headers

mod builder;
mod dtype;
mod error;
mod record;

pub use builder::TensorCatalogBuilder;
pub use dtype::{byte_width, DType, UNKNOWN_DTYPE_WIDTH};
pub use error::CatalogError;
pub use record::{element_count, CatalogSource, DtypeSummary, TensorCatalog, TensorRecord};
