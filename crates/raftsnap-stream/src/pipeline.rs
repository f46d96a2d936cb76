use std::io::Read;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::delimited::{read_records, DecodeSummary, MAX_RECORD_SIZE};
use crate::error::{StreamError, StreamResult};
use crate::record::Record;

/// Tuning for [`spawn_decoder`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Records buffered between the decoder and the consumer. Clamped to 1.
    pub channel_capacity: usize,
    pub max_record_size: u64,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 1024,
            max_record_size: MAX_RECORD_SIZE,
        }
    }
}

/// Consumer side of a running decoder.
///
/// Records arrive in stream order. Once [`next`](Self::next) returns `None`,
/// [`finish`](Self::finish) yields the decoder's terminal result: the summary
/// on a clean end of stream, or the error that stopped it. Dropping the stream
/// early makes the decoder stop at its next send.
#[derive(Debug)]
pub struct RecordStream {
    records: mpsc::Receiver<Record>,
    result: oneshot::Receiver<StreamResult<DecodeSummary>>,
}

impl RecordStream {
    pub async fn next(&mut self) -> Option<Record> {
        self.records.recv().await
    }

    /// Wait for the decoder's terminal result.
    ///
    /// Records not yet received are discarded, and a decoder that still had
    /// records to send reports [`StreamError::Cancelled`].
    pub async fn finish(mut self) -> StreamResult<DecodeSummary> {
        self.records.close();
        match self.result.await {
            Ok(result) => result,
            Err(_) => Err(StreamError::ProducerFailed(
                "decoder task ended without a result".to_string(),
            )),
        }
    }

    /// Hand every record to `f`, then return the terminal result.
    ///
    /// Records decoded before a stream error are still delivered; the error is
    /// returned afterwards. An error from `f` stops the decoder.
    pub async fn for_each<F>(mut self, mut f: F) -> StreamResult<DecodeSummary>
    where
        F: FnMut(Record) -> StreamResult<()>,
    {
        while let Some(record) = self.next().await {
            f(record)?;
        }
        self.finish().await
    }
}

/// Decode `reader` on tokio's blocking pool and stream the records back.
///
/// Must be called from within a tokio runtime.
pub fn spawn_decoder<R>(reader: R, config: DecoderConfig) -> RecordStream
where
    R: Read + Send + 'static,
{
    let (tx, records) = mpsc::channel(config.channel_capacity.max(1));
    let (done, result) = oneshot::channel();

    tokio::task::spawn_blocking(move || {
        let mut sent = 0u64;
        let outcome = read_records(reader, config.max_record_size, |record| {
            tx.blocking_send(record)
                .map_err(|_| StreamError::Cancelled { records: sent })?;
            sent += 1;
            Ok(())
        });
        // Close the record channel before publishing the result so the
        // consumer sees end-of-records first.
        drop(tx);

        match &outcome {
            Ok(summary) => debug!(records = summary.records, "decoder finished"),
            Err(StreamError::Cancelled { records }) => {
                debug!(records, "decoder stopped by consumer")
            }
            Err(e) => warn!(error = ?e, records = sent, "decoder failed"),
        }
        if done.send(outcome).is_err() {
            debug!("decoder result dropped; consumer is gone");
        }
    });

    RecordStream { records, result }
}
