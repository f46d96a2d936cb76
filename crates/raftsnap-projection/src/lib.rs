//! Record projection for raftsnap.
//!
//! Decoded records flow through a [`ProjectionBuilder`], which inserts every
//! key into one open [`ProjectionTxn`] and hands the record to a pluggable
//! [`RecordSink`]. [`KvStatsAggregator`] is the sink that groups keys into
//! path-prefix buckets.

pub mod error;
pub mod projection;
pub mod sink;
pub mod stats;

pub use error::{ProjectionError, ProjectionResult};
pub use projection::{OrderedProjection, ProjectionTxn};
pub use sink::{BuildOutput, ProjectionBuilder, RecordSink};
pub use stats::{bucket_of, KvStats, KvStatsAggregator, KvStatsConfig};
