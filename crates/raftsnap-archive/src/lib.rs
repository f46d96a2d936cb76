//! Snapshot archive reader for raftsnap.
//!
//! A raft snapshot archive is a gzip-compressed tar stream with a closed set
//! of entries:
//!
//! - `meta.json`: snapshot identity (ID, index, term, version, size)
//! - `state.bin`: length-delimited record payload
//! - `SHA256SUMS`: digests of `meta.json` and `state.bin`
//! - `SHA256SUMS.sealed`: optional sealed copy of the manifest (read, not checked)
//!
//! # Architecture
//!
//! - **[`demultiplex`]**: decompresses the input, walks the tar entries, and
//!   routes each one to the hash ledger, an in-memory buffer, or a scratch sink
//! - **[`SnapshotVerifier`]**: runs the demultiplexer into a scratch file,
//!   verifies the manifest, and hands back a rewound [`VerifiedSnapshot`]

pub mod demux;
pub mod entry;
pub mod error;
pub mod verifier;

pub use demux::{demultiplex, DemuxOutput};
pub use entry::{EntryKind, MAX_SEALED_SUMS_SIZE};
pub use error::{ArchiveError, ArchiveResult};
pub use verifier::{SnapshotVerifier, VerifiedSnapshot};
