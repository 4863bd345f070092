//! Bucket and shard identity for sink output partitions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of one output partition: a bucket plus a shard within it.
///
/// Records whose key is absent land in a dedicated null-key bucket that is
/// named with a fixed label instead of a numeric one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BucketShardId {
    bucket_id: u32,
    shard_id: u32,
    null_key: bool,
}

impl BucketShardId {
    /// Identity of a numbered bucket/shard pair.
    pub fn of(bucket_id: u32, shard_id: u32) -> Self {
        Self {
            bucket_id,
            shard_id,
            null_key: false,
        }
    }

    /// Identity of a shard of the null-key bucket.
    pub fn of_null_key(shard_id: u32) -> Self {
        Self {
            bucket_id: 0,
            shard_id,
            null_key: true,
        }
    }

    pub fn bucket_id(&self) -> u32 {
        self.bucket_id
    }

    pub fn shard_id(&self) -> u32 {
        self.shard_id
    }

    /// Whether this partition holds records without a key.
    pub fn is_null_key_bucket(&self) -> bool {
        self.null_key
    }
}

impl fmt::Display for BucketShardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.null_key {
            write!(f, "null-key bucket, shard {}", self.shard_id)
        } else {
            write!(f, "bucket {}, shard {}", self.bucket_id, self.shard_id)
        }
    }
}

/// Counts a finalized sink was written with.
///
/// Implemented by whatever owns the sink's persisted metadata; the filename
/// policy only reads the two counts.
pub trait BucketMetadata {
    /// Number of buckets the sink partitions keys into.
    fn num_buckets(&self) -> u32;

    /// Number of shards each bucket is split across.
    fn num_shards(&self) -> u32;
}
