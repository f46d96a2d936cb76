//! High-level SDK for raftsnap.
//!
//! [`Inspector`] runs the whole pipeline for one snapshot archive: integrity
//! verification, streaming record decode, projection, and key statistics.
//! This is the entry point for tools embedding the inspector.

pub mod config;
pub mod error;
pub mod inspector;

pub use config::InspectConfig;
pub use error::{SdkError, SdkResult};
pub use inspector::Inspector;

// Re-export key types
pub use raftsnap_projection::KvStatsConfig;
pub use raftsnap_types::{InspectionReport, PrefixBucket, SnapshotMetadata, SnapshotVersion};
