//! End-to-end path format tests for the filename policy.
//!
//! These pin the exact wire format of produced paths: readers of bucketed
//! sink output depend on these strings byte-for-byte.

use regex::Regex;

use sortedbucket::{BucketShardId, FileAssignment, FilenamePolicy, ResourceId};

fn policy() -> FilenamePolicy {
    let root = ResourceId::from_uri("gs://bucket/out/").unwrap();
    FilenamePolicy::new(root, "data", ".avro").unwrap()
}

#[test]
fn final_bucket_shard_path_format() {
    let path = policy()
        .for_destination()
        .for_bucket(BucketShardId::of(2, 1), 10, 4)
        .unwrap();

    assert_eq!(
        path.to_string(),
        "gs://bucket/out/data-00002-of-00010-shard-00001-of-00004.avro"
    );
}

#[test]
fn temp_assignment_lives_under_run_scoped_directory() {
    let policy = policy();
    let temp_root = ResourceId::from_uri("gs://tmp/").unwrap();
    let temp = policy.for_temp_files(&temp_root).unwrap();

    assert_eq!(
        temp.directory().to_string(),
        format!("gs://tmp/.temp-beam-{}/", policy.run_id())
    );

    let path = temp
        .for_bucket(BucketShardId::of(2, 1), 10, 4)
        .unwrap()
        .to_string();

    let pattern = Regex::new(
        r"^gs://tmp/\.temp-beam-[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}/\d{4}-\d{2}-\d{2}_\d{2}-\d{2}-\d{2}-data-00002-of-00010-shard-00001-of-00004\.avro$",
    )
    .unwrap();
    assert!(pattern.is_match(&path), "unexpected temp path: {path}");
}

#[test]
fn null_key_glob_matches_every_null_key_output() {
    let assignment = policy().for_destination();
    let glob = assignment.for_null_keys().unwrap().to_string();

    // The pattern has a single `*`; match it by prefix/suffix split.
    let (glob_prefix, glob_suffix) = glob.split_once('*').unwrap();

    for num_shards in [1, 2, 8] {
        for shard_id in 0..num_shards {
            let path = assignment
                .for_bucket(BucketShardId::of_null_key(shard_id), 16, num_shards)
                .unwrap()
                .to_string();
            assert!(
                path.starts_with(glob_prefix) && path.ends_with(glob_suffix),
                "{path} not matched by {glob}"
            );
        }
    }
}

#[test]
fn dst_metadata_ignores_temp_configuration() {
    let policy = policy();
    let temp_root = ResourceId::from_uri("gs://tmp/").unwrap();

    // Deriving a temp assignment configures timestamping, but locating the
    // metadata of a finalized destination must stay untimestamped.
    let _temp = policy.for_temp_files(&temp_root).unwrap();
    let finalized = ResourceId::from_uri("gs://bucket/out/").unwrap();
    let path = FileAssignment::dst_metadata(&finalized).unwrap();

    assert_eq!(path.to_string(), "gs://bucket/out/metadata.json");
}

#[test]
fn shipped_policy_names_the_same_paths() {
    // A policy serialized to a worker must produce the same final paths and
    // the same temp namespace as the original.
    let policy = policy();
    let json = serde_json::to_string(&policy).unwrap();
    let shipped: FilenamePolicy = serde_json::from_str(&json).unwrap();

    assert_eq!(shipped.run_id(), policy.run_id());

    let id = BucketShardId::of(7, 3);
    let original = policy
        .for_destination()
        .for_bucket(id, 16, 8)
        .unwrap()
        .to_string();
    let remote = shipped
        .for_destination()
        .for_bucket(id, 16, 8)
        .unwrap()
        .to_string();
    assert_eq!(original, remote);
}

#[test]
fn distinct_bucket_shard_pairs_never_collide() {
    let assignment = policy().for_destination();
    let mut seen = std::collections::HashSet::new();

    for bucket_id in 0..8 {
        for shard_id in 0..4 {
            let path = assignment
                .for_bucket(BucketShardId::of(bucket_id, shard_id), 8, 4)
                .unwrap()
                .to_string();
            assert!(seen.insert(path.clone()), "collision on {path}");
        }
    }
}

#[test]
fn display_data_serializes_for_observability() {
    let data = policy().for_destination().display_data();
    let json = serde_json::to_value(&data).unwrap();

    assert_eq!(json["directory"], "gs://bucket/out/");
    assert_eq!(json["filenameSuffix"], ".avro");
}
