//! Sharded checkpoints described by an index manifest

mod error;
mod index;
mod resolver;

pub use error::ResolveError;
pub use index::ShardIndex;
pub use resolver::{ResolvedShards, ShardedIndexResolver};
