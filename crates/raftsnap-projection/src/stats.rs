use std::collections::HashMap;

use raftsnap_stream::Record;
use raftsnap_types::{sort_buckets, PrefixBucket};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ProjectionError, ProjectionResult};
use crate::sink::RecordSink;

const SEPARATOR: u8 = b'/';

/// Key-prefix statistics settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KvStatsConfig {
    pub enabled: bool,
    /// Number of `/`-separated segments that name a bucket.
    pub depth: usize,
    /// Literal byte prefix a key must start with to be counted.
    pub filter: String,
}

impl Default for KvStatsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            depth: 2,
            filter: String::new(),
        }
    }
}

impl KvStatsConfig {
    pub fn validate(&self) -> ProjectionResult<()> {
        if self.depth == 0 {
            return Err(ProjectionError::InvalidDepth { depth: self.depth });
        }
        Ok(())
    }
}

/// The bucket a key falls into: its first `depth` segments.
///
/// Keys with fewer segments than `depth` are their own bucket.
pub fn bucket_of(key: &[u8], depth: usize) -> &[u8] {
    let cut = key
        .iter()
        .enumerate()
        .filter(|(_, b)| **b == SEPARATOR)
        .nth(depth.saturating_sub(1))
        .map(|(i, _)| i);
    match cut {
        Some(end) => &key[..end],
        None => key,
    }
}

/// Final statistics of one run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KvStats {
    /// Buckets in report order.
    pub buckets: Vec<PrefixBucket>,
    pub total: u64,
}

/// Counts records per key-prefix bucket.
#[derive(Debug)]
pub struct KvStatsAggregator {
    config: KvStatsConfig,
    counts: HashMap<String, u64>,
    total: u64,
}

impl KvStatsAggregator {
    pub fn new(config: KvStatsConfig) -> ProjectionResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            counts: HashMap::new(),
            total: 0,
        })
    }

    /// An aggregator that counts nothing.
    pub fn disabled() -> Self {
        Self {
            config: KvStatsConfig::default(),
            counts: HashMap::new(),
            total: 0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn observe_key(&mut self, key: &[u8]) {
        if !self.config.enabled || key.is_empty() {
            return;
        }
        if !key.starts_with(self.config.filter.as_bytes()) {
            return;
        }

        let bucket = String::from_utf8_lossy(bucket_of(key, self.config.depth));
        match self.counts.get_mut(&*bucket) {
            Some(count) => *count += 1,
            None => {
                self.counts.insert(bucket.into_owned(), 1);
            }
        }
        self.total += 1;
    }

    /// Records counted so far.
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn finish(self) -> KvStats {
        let buckets = sort_buckets(
            self.counts
                .into_iter()
                .map(|(prefix, count)| PrefixBucket::new(prefix, count))
                .collect(),
        );
        debug!(
            buckets = buckets.len(),
            total = self.total,
            "key statistics aggregated"
        );
        KvStats {
            buckets,
            total: self.total,
        }
    }
}

impl RecordSink for KvStatsAggregator {
    fn observe(&mut self, record: &Record) {
        self.observe_key(&record.key);
    }
}
