use std::io;

use raftsnap_crypto::IntegrityError;
use raftsnap_types::TypeError;
use thiserror::Error;

/// Errors produced while reading and verifying a snapshot archive.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// I/O failure, tagged with the operation that failed.
    #[error("failed to {context}")]
    Io {
        context: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("unexpected file {name:?} in snapshot")]
    UnexpectedEntry { name: String },

    #[error("duplicate file {name:?} in snapshot")]
    DuplicateEntry { name: &'static str },

    #[error("snapshot is missing {name:?}")]
    MissingEntry { name: &'static str },

    #[error("failed to decode snapshot metadata")]
    Metadata(#[source] TypeError),

    #[error("read max specified bytes ({max}) of {name:?} without EOF - possible truncation")]
    PossibleTruncation { name: &'static str, max: u64 },

    #[error("{count} unread bytes remain in the {layer} stream")]
    UnreadBytes { count: u64, layer: &'static str },

    #[error("failed checking integrity of snapshot")]
    Integrity(#[from] IntegrityError),
}

impl ArchiveError {
    pub(crate) fn io(context: &'static str) -> impl FnOnce(io::Error) -> Self {
        move |source| Self::Io { context, source }
    }
}

pub type ArchiveResult<T> = Result<T, ArchiveError>;
