//! sortedbucket: deterministic file naming for bucketed, sharded sink output.
//!
//! This crate computes where a bucketed sink's files go:
//!
//! - `resource` - syntactic path handles over cloud URIs and local paths
//! - `bucket` - bucket/shard identity and the persisted-counts interface
//! - `naming` - the filename policy and per-directory file assignment
//! - `error` - typed errors for parsing, resolution, and assignment
//!
//! It performs no I/O. Callers hand the computed paths to their runtime's
//! file system layer, which owns directory creation, the actual writes, and
//! the atomic move from the temp directory to the final destination.

pub mod bucket;
pub mod error;
pub mod naming;
pub mod resource;

// Re-export commonly used items
pub use bucket::{BucketMetadata, BucketShardId};
pub use error::{NamingError, ResourceError};
pub use naming::{DisplayData, FileAssignment, FilenamePolicy};
pub use resource::{ResolveKind, ResourceId};
