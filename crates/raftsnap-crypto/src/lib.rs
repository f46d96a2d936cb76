//! Integrity primitives for raftsnap.
//!
//! Provides the [`HashLedger`], which tracks a named set of expected files and
//! their running SHA-256 digests, and verifies them against a `SHA256SUMS`
//! manifest. Digests are keyed by logical file name, so the order in which
//! archive entries arrive never affects verification.
//!
//! All hashing wraps the `sha2` crate.

pub mod error;
pub mod ledger;
pub mod manifest;
pub mod tee;

pub use error::{IntegrityError, IntegrityFailure};
pub use ledger::{DigestHandle, HashLedger};
pub use manifest::{parse_manifest, ManifestLine};
pub use tee::{HashingReader, HashingWriter};
