//! Filename policy for bucketed, sharded sink output.
//!
//! File names are assigned uniquely per [`BucketShardId`]. The policy
//! behaves differently for the initial write to temp files and for the move
//! of those files to their final destination: temp writes must be
//! idempotent under bundle retries, so temp file names carry a wall-clock
//! timestamp and a retried bundle cannot be confused with an earlier,
//! partially-written attempt in the same temp namespace.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use snafu::prelude::*;
use tracing::debug;
use uuid::Uuid;

use crate::bucket::{BucketMetadata, BucketShardId};
use crate::error::{
    BucketIdOutOfRangeSnafu, NamingError, OutputRootNotADirectorySnafu, ResolveSnafu,
    ShardIdOutOfRangeSnafu,
};
use crate::resource::{ResolveKind, ResourceId};

const TEMP_DIRECTORY_PREFIX: &str = ".temp-beam";
const NULL_KEYS_BUCKET: &str = "null-keys";
const METADATA_FILENAME: &str = "metadata.json";
const TEMPFILE_TIMESTAMP: &str = "%Y-%m-%d_%H-%M-%S-";

/// Naming policy for one bucketed sink.
///
/// Constructed once per sink configuration. All state is plain strings and
/// numbers, so a policy serializes cleanly and can be shipped to workers;
/// the run id travels with it, keeping every worker in the same temp
/// namespace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilenamePolicy {
    directory: ResourceId,
    filename_prefix: String,
    filename_suffix: String,
    run_id: Uuid,
}

impl FilenamePolicy {
    /// Create a policy rooted at `directory`.
    ///
    /// Fails unless `directory` denotes a directory. Generates the run id
    /// that namespaces this policy's temp output.
    pub fn new(
        directory: ResourceId,
        filename_prefix: impl Into<String>,
        filename_suffix: impl Into<String>,
    ) -> Result<Self, NamingError> {
        ensure!(
            directory.is_directory(),
            OutputRootNotADirectorySnafu {
                uri: directory.to_string()
            }
        );

        Ok(Self {
            directory,
            filename_prefix: filename_prefix.into(),
            filename_suffix: filename_suffix.into(),
            run_id: Uuid::new_v4(),
        })
    }

    /// File assignment for final, post-commit output paths.
    pub fn for_destination(&self) -> FileAssignment {
        FileAssignment::new(
            self.directory.clone(),
            &self.filename_prefix,
            &self.filename_suffix,
            false,
        )
    }

    /// File assignment for temp writes, rooted at
    /// `<temp_root>/.temp-beam-<run id>/`.
    ///
    /// Every work item retried under this policy re-executes in the same
    /// temp directory; the timestamped file names keep attempts apart.
    pub fn for_temp_files(&self, temp_root: &ResourceId) -> Result<FileAssignment, NamingError> {
        let temp_dir_name = format!("{TEMP_DIRECTORY_PREFIX}-{}", self.run_id);
        let temp_dir = temp_root
            .current_directory()
            .resolve(&temp_dir_name, ResolveKind::Directory)
            .context(ResolveSnafu)?;

        debug!(temp_dir = %temp_dir, "derived temp file assignment");

        Ok(FileAssignment::new(
            temp_dir,
            &self.filename_prefix,
            &self.filename_suffix,
            true,
        ))
    }

    /// Run identifier namespacing this policy's temp directory.
    ///
    /// Exposed for diagnostics and tests; naming decisions outside this
    /// module must not depend on it.
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }
}

/// The filename shapes an assignment can take.
///
/// Classification is total over (null-key, shard count), so template
/// selection stays exhaustive instead of hiding in nested conditionals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NamingCase {
    /// Null-key bucket written by a single shard.
    NullKeys,
    /// Null-key bucket written by several shards. The shard index never
    /// appears in the name; concurrent writers are told apart by the
    /// timestamp prefix and enumerated through the null-key glob.
    NullKeysSharded,
    /// Numbered bucket when the sink writes exactly one shard.
    BucketOnly { bucket_id: u32, num_buckets: u32 },
    /// Numbered bucket and shard.
    BucketShard {
        bucket_id: u32,
        num_buckets: u32,
        shard_id: u32,
        num_shards: u32,
    },
}

impl NamingCase {
    fn classify(id: BucketShardId, num_buckets: u32, num_shards: u32) -> Self {
        match (id.is_null_key_bucket(), num_shards) {
            (true, 1) => NamingCase::NullKeys,
            (true, _) => NamingCase::NullKeysSharded,
            (false, 1) => NamingCase::BucketOnly {
                bucket_id: id.bucket_id(),
                num_buckets,
            },
            (false, _) => NamingCase::BucketShard {
                bucket_id: id.bucket_id(),
                num_buckets,
                shard_id: id.shard_id(),
                num_shards,
            },
        }
    }

    fn render(&self, prefix: &str, suffix: &str) -> String {
        match *self {
            NamingCase::NullKeys | NamingCase::NullKeysSharded => {
                format!("{prefix}-{NULL_KEYS_BUCKET}{suffix}")
            }
            NamingCase::BucketOnly {
                bucket_id,
                num_buckets,
            } => format!("{prefix}-{bucket_id:05}-of-{num_buckets:05}{suffix}"),
            NamingCase::BucketShard {
                bucket_id,
                num_buckets,
                shard_id,
                num_shards,
            } => format!(
                "{prefix}-{bucket_id:05}-of-{num_buckets:05}-shard-{shard_id:05}-of-{num_shards:05}{suffix}"
            ),
        }
    }
}

/// Read-only description of a file assignment for observability tooling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayData {
    pub directory: String,
    pub filename_suffix: String,
}

/// Assigns file names under one output directory.
///
/// Pure function over its bound state; optionally prepends a timestamp to
/// every file name for idempotent temp writes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileAssignment {
    directory: ResourceId,
    filename_prefix: String,
    filename_suffix: String,
    timestamp_files: bool,
}

impl FileAssignment {
    fn new(directory: ResourceId, prefix: &str, suffix: &str, timestamp_files: bool) -> Self {
        Self {
            directory,
            filename_prefix: prefix.to_string(),
            filename_suffix: suffix.to_string(),
            timestamp_files,
        }
    }

    /// Output path for one bucket/shard pair.
    ///
    /// `id` must fall below both bounds. Single-shard sinks and the
    /// null-key bucket drop the shard segment from the name.
    pub fn for_bucket(
        &self,
        id: BucketShardId,
        num_buckets: u32,
        num_shards: u32,
    ) -> Result<ResourceId, NamingError> {
        self.for_bucket_at(id, num_buckets, num_shards, Utc::now())
    }

    /// Output path for one bucket/shard pair, with the bounds taken from
    /// the sink's persisted metadata.
    pub fn for_bucket_with<M: BucketMetadata>(
        &self,
        id: BucketShardId,
        metadata: &M,
    ) -> Result<ResourceId, NamingError> {
        self.for_bucket(id, metadata.num_buckets(), metadata.num_shards())
    }

    fn for_bucket_at(
        &self,
        id: BucketShardId,
        num_buckets: u32,
        num_shards: u32,
        now: DateTime<Utc>,
    ) -> Result<ResourceId, NamingError> {
        ensure!(
            id.bucket_id() < num_buckets,
            BucketIdOutOfRangeSnafu {
                id,
                max_num_buckets: num_buckets,
            }
        );
        ensure!(
            id.shard_id() < num_shards,
            ShardIdOutOfRangeSnafu {
                id,
                max_num_shards: num_shards,
            }
        );

        let case = NamingCase::classify(id, num_buckets, num_shards);
        let filename = format!(
            "{}{}",
            self.timestamp_prefix(now),
            case.render(&self.filename_prefix, &self.filename_suffix)
        );

        self.directory
            .resolve(&filename, ResolveKind::File)
            .context(ResolveSnafu)
    }

    /// Path of this assignment's metadata file.
    pub fn for_metadata(&self) -> Result<ResourceId, NamingError> {
        self.for_metadata_at(Utc::now())
    }

    fn for_metadata_at(&self, now: DateTime<Utc>) -> Result<ResourceId, NamingError> {
        let filename = format!("{}{METADATA_FILENAME}", self.timestamp_prefix(now));
        self.directory
            .resolve(&filename, ResolveKind::File)
            .context(ResolveSnafu)
    }

    /// Glob matching every file written for the null-key bucket.
    ///
    /// Null-key output never carries a shard index, so several writers may
    /// emit physically distinct files that all match this pattern.
    pub fn for_null_keys(&self) -> Result<ResourceId, NamingError> {
        self.directory
            .resolve(
                &format!("{NULL_KEYS_BUCKET}*{}", self.filename_suffix),
                ResolveKind::File,
            )
            .context(ResolveSnafu)
    }

    /// Metadata file of an already-finalized output directory.
    ///
    /// Never timestamped, regardless of how the reading policy is
    /// configured.
    pub fn dst_metadata(directory: &ResourceId) -> Result<ResourceId, NamingError> {
        directory
            .resolve(METADATA_FILENAME, ResolveKind::File)
            .context(ResolveSnafu)
    }

    /// Directory this assignment writes under.
    pub fn directory(&self) -> &ResourceId {
        &self.directory
    }

    /// Structured description for observability tooling. Does not feed back
    /// into naming.
    pub fn display_data(&self) -> DisplayData {
        DisplayData {
            directory: self.directory.to_string(),
            filename_suffix: self.filename_suffix.clone(),
        }
    }

    fn timestamp_prefix(&self, now: DateTime<Utc>) -> String {
        if self.timestamp_files {
            now.format(TEMPFILE_TIMESTAMP).to_string()
        } else {
            String::new()
        }
    }
}
