//! Error types for resource paths and filename assignment.

use snafu::prelude::*;

use crate::bucket::BucketShardId;

/// Errors produced when parsing or resolving resource paths.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ResourceError {
    /// The input string could not be parsed as a path or URI.
    #[snafu(display("Invalid resource URI: {uri:?}"))]
    InvalidUri { uri: String },

    /// A resolve was attempted against a resource that is not a directory.
    #[snafu(display("Cannot resolve a name under non-directory resource: {uri}"))]
    NotADirectory { uri: String },

    /// The name passed to resolve was empty or contained a path separator.
    #[snafu(display("Invalid path segment: {name:?}"))]
    InvalidSegment { name: String },
}

/// Errors produced by the filename policy.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum NamingError {
    /// The output root handed to the policy does not denote a directory.
    #[snafu(display("Output root must be a directory: {uri}"))]
    OutputRootNotADirectory { uri: String },

    /// Bucket id at or above the sink's bucket count.
    #[snafu(display("Can't assign a filename for {id}: max number of buckets is {max_num_buckets}"))]
    BucketIdOutOfRange {
        id: BucketShardId,
        max_num_buckets: u32,
    },

    /// Shard id at or above the sink's shard count.
    #[snafu(display("Can't assign a filename for {id}: max number of shards is {max_num_shards}"))]
    ShardIdOutOfRange {
        id: BucketShardId,
        max_num_shards: u32,
    },

    /// Path resolution failed under the bound output directory.
    #[snafu(display("Failed to resolve output path: {source}"))]
    Resolve { source: ResourceError },
}
