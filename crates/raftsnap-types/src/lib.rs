//! Foundation types for raftsnap.
//!
//! This crate provides the data model shared by every stage of snapshot
//! inspection. Every other raftsnap crate depends on `raftsnap-types`.
//!
//! # Key Types
//!
//! - [`SnapshotMetadata`]: Raft snapshot identity parsed from `meta.json`
//! - [`SnapshotVersion`]: Snapshot format version (integer enum)
//! - [`Sha256Digest`]: Fixed-length SHA-256 digest with hex encoding
//! - [`PrefixBucket`]: Record count for one key-prefix group
//! - [`InspectionReport`]: Final, immutable result of one inspection run

pub mod digest;
pub mod error;
pub mod metadata;
pub mod report;

pub use digest::Sha256Digest;
pub use error::TypeError;
pub use metadata::{SnapshotMetadata, SnapshotVersion};
pub use report::{sort_buckets, InspectionReport, PrefixBucket};
