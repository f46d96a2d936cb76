//! Streaming record decoder for raftsnap.
//!
//! `state.bin` is a sequence of protobuf `StorageEntry` messages, each prefixed
//! by its varint-encoded length. This crate decodes that sequence without
//! materializing it:
//!
//! - [`DelimitedReader`] is a pull-based iterator; each `next` decodes one record
//! - [`read_records`] drives a reader to completion, handing each record to a callback
//! - [`spawn_decoder`] runs the decode on a blocking task and streams records to
//!   the caller over a bounded channel, with the terminal result delivered once
//!   through a single-slot handoff

pub mod delimited;
pub mod error;
pub mod pipeline;
pub mod record;

pub use delimited::{read_records, DecodeSummary, DelimitedReader, MAX_RECORD_SIZE};
pub use error::{StreamError, StreamResult};
pub use pipeline::{spawn_decoder, DecoderConfig, RecordStream};
pub use record::Record;
