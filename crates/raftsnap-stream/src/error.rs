use std::io;

/// Errors produced while decoding the record stream.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("failed to read record stream at offset {offset}")]
    Io {
        offset: u64,
        #[source]
        source: io::Error,
    },

    /// Length prefix larger than the configured maximum.
    #[error("record at offset {offset} declares {len} bytes, limit is {max}")]
    FrameTooLarge { offset: u64, len: u64, max: u64 },

    /// Stream ended inside a length prefix or a record body.
    #[error("truncated record at offset {offset}: expected {expected} bytes, got {actual}")]
    TruncatedFrame {
        offset: u64,
        expected: u64,
        actual: u64,
    },

    #[error("length prefix overflow at offset {offset}")]
    VarintOverflow { offset: u64 },

    #[error("failed to decode record at offset {offset}")]
    Decode {
        offset: u64,
        #[source]
        source: prost::DecodeError,
    },

    /// The consumer dropped the stream before the producer finished.
    #[error("record consumer hung up after {records} records")]
    Cancelled { records: u64 },

    /// The producer task ended without reporting a result.
    #[error("record decoder failed: {0}")]
    ProducerFailed(String),
}

pub type StreamResult<T> = Result<T, StreamError>;
