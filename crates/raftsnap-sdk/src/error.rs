use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("failed to open snapshot {}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read config {}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config: {0}")]
    Config(String),

    #[error("snapshot verification failed")]
    Archive(#[from] raftsnap_archive::ArchiveError),

    /// The verified `state.bin` could not be read back from scratch storage.
    #[error("failed to reopen staged snapshot data")]
    Staging(#[source] raftsnap_archive::ArchiveError),

    #[error("failed to decode snapshot records")]
    Stream(#[from] raftsnap_stream::StreamError),

    #[error("invalid statistics settings")]
    Projection(#[from] raftsnap_projection::ProjectionError),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type SdkResult<T> = Result<T, SdkError>;
