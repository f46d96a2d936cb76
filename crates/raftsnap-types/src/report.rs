use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::metadata::SnapshotMetadata;

/// Record count for one key-prefix group.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrefixBucket {
    #[serde(rename = "Name")]
    pub prefix: String,
    #[serde(rename = "Count")]
    pub count: u64,
}

impl PrefixBucket {
    pub fn new(prefix: impl Into<String>, count: u64) -> Self {
        Self {
            prefix: prefix.into(),
            count,
        }
    }
}

/// Report ordering: descending count, ties broken by ascending prefix.
fn report_order(a: &PrefixBucket, b: &PrefixBucket) -> Ordering {
    b.count
        .cmp(&a.count)
        .then_with(|| a.prefix.cmp(&b.prefix))
}

/// Sort buckets into report order.
pub fn sort_buckets(mut buckets: Vec<PrefixBucket>) -> Vec<PrefixBucket> {
    buckets.sort_by(report_order);
    buckets
}

/// Result of one inspection run, handed to a renderer.
///
/// Serialized field names match the JSON report of the operator's
/// `raft snapshot inspect` command, so existing scripts keep working.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectionReport {
    #[serde(rename = "Meta")]
    pub metadata: SnapshotMetadata,
    /// Buckets in report order. Empty when KV statistics were disabled.
    #[serde(rename = "StatsKV")]
    pub buckets: Vec<PrefixBucket>,
    /// Records counted into some bucket.
    #[serde(rename = "TotalCountKV")]
    pub total_count: u64,
    /// Every record decoded from `state.bin`, counted or not.
    #[serde(rename = "RecordsDecoded")]
    pub records_decoded: u64,
    /// Distinct keys in the committed projection.
    #[serde(rename = "UniqueKeys")]
    pub unique_keys: u64,
}

impl InspectionReport {
    /// Assemble a report, putting `buckets` into report order.
    pub fn new(
        metadata: SnapshotMetadata,
        buckets: Vec<PrefixBucket>,
        total_count: u64,
        records_decoded: u64,
        unique_keys: u64,
    ) -> Self {
        Self {
            metadata,
            buckets: sort_buckets(buckets),
            total_count,
            records_decoded,
            unique_keys,
        }
    }

    /// Look up a bucket by prefix.
    pub fn bucket(&self, prefix: &str) -> Option<&PrefixBucket> {
        self.buckets.iter().find(|b| b.prefix == prefix)
    }

    /// Returns `true` if the report carries any KV statistics.
    pub fn has_kv_stats(&self) -> bool {
        !self.buckets.is_empty()
    }
}
