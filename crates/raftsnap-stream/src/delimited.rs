use std::io::{BufRead, BufReader, Read};

use prost::Message;
use tracing::debug;

use crate::error::{StreamError, StreamResult};
use crate::record::Record;

/// Largest record body accepted: arbitrarily large, but bounded so a corrupt
/// length prefix cannot demand an unbounded allocation.
pub const MAX_RECORD_SIZE: u64 = i32::MAX as u64;

const MAX_VARINT_LEN: usize = 10;
const READ_BUF: usize = 64 * 1024;

/// Totals for one pass over a record stream.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DecodeSummary {
    pub records: u64,
    pub bytes: u64,
}

/// Pull-based decoder for varint-length-delimited records.
///
/// Each call to [`read_record`](Self::read_record) decodes exactly one record.
/// A clean end of input on a record boundary yields `Ok(None)`; end of input
/// anywhere else is a [`StreamError::TruncatedFrame`].
pub struct DelimitedReader<R> {
    reader: BufReader<R>,
    max_size: u64,
    offset: u64,
    records: u64,
    done: bool,
    buf: Vec<u8>,
}

impl<R: Read> DelimitedReader<R> {
    pub fn new(inner: R) -> Self {
        Self::with_max_size(inner, MAX_RECORD_SIZE)
    }

    pub fn with_max_size(inner: R, max_size: u64) -> Self {
        Self {
            reader: BufReader::with_capacity(READ_BUF, inner),
            max_size,
            offset: 0,
            records: 0,
            done: false,
            buf: Vec::new(),
        }
    }

    /// Records decoded and bytes consumed so far.
    pub fn summary(&self) -> DecodeSummary {
        DecodeSummary {
            records: self.records,
            bytes: self.offset,
        }
    }

    /// Decode the next record, or `None` at a clean end of stream.
    pub fn read_record(&mut self) -> StreamResult<Option<Record>> {
        let start = self.offset;
        let len = match self.read_len()? {
            Some(len) => len,
            None => return Ok(None),
        };
        if len > self.max_size {
            return Err(StreamError::FrameTooLarge {
                offset: start,
                len,
                max: self.max_size,
            });
        }

        // Grow the buffer as bytes arrive rather than trusting the prefix.
        self.buf.clear();
        let body_offset = self.offset;
        let actual = (&mut self.reader)
            .take(len)
            .read_to_end(&mut self.buf)
            .map_err(|source| StreamError::Io {
                offset: body_offset,
                source,
            })? as u64;
        self.offset += actual;
        if actual != len {
            return Err(StreamError::TruncatedFrame {
                offset: start,
                expected: len,
                actual,
            });
        }

        let record = Record::decode(self.buf.as_slice())
            .map_err(|source| StreamError::Decode {
                offset: start,
                source,
            })?;
        self.records += 1;
        Ok(Some(record))
    }

    fn read_len(&mut self) -> StreamResult<Option<u64>> {
        let start = self.offset;
        let mut value = 0u64;
        let mut shift = 0u32;

        for i in 0..MAX_VARINT_LEN {
            let byte = match self.next_byte()? {
                Some(byte) => byte,
                None if i == 0 => return Ok(None),
                None => {
                    return Err(StreamError::TruncatedFrame {
                        offset: start,
                        expected: i as u64 + 1,
                        actual: i as u64,
                    })
                }
            };
            if i == MAX_VARINT_LEN - 1 && byte > 1 {
                return Err(StreamError::VarintOverflow { offset: start });
            }
            value |= u64::from(byte & 0x7f) << shift;
            if byte & 0x80 == 0 {
                return Ok(Some(value));
            }
            shift += 7;
        }
        Err(StreamError::VarintOverflow { offset: start })
    }

    fn next_byte(&mut self) -> StreamResult<Option<u8>> {
        let offset = self.offset;
        let buf = self
            .reader
            .fill_buf()
            .map_err(|source| StreamError::Io { offset, source })?;
        let Some(&byte) = buf.first() else {
            return Ok(None);
        };
        self.reader.consume(1);
        self.offset += 1;
        Ok(Some(byte))
    }
}

impl<R: Read> Iterator for DelimitedReader<R> {
    type Item = StreamResult<Record>;

    /// Yields records until a clean end of stream or the first error, after
    /// which the iterator is exhausted.
    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Decode every record in `reader`, handing each to `handler` in stream order.
///
/// A record reaches the handler only after it decoded successfully. The first
/// decode or handler error stops the pass and is returned.
pub fn read_records<R, F>(reader: R, max_size: u64, mut handler: F) -> StreamResult<DecodeSummary>
where
    R: Read,
    F: FnMut(Record) -> StreamResult<()>,
{
    let mut reader = DelimitedReader::with_max_size(reader, max_size);
    while let Some(record) = reader.read_record()? {
        handler(record)?;
    }
    let summary = reader.summary();
    debug!(
        records = summary.records,
        bytes = summary.bytes,
        "record stream exhausted"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(records: &[Record]) -> Vec<u8> {
        let mut out = Vec::new();
        for record in records {
            record.encode_length_delimited(&mut out).unwrap();
        }
        out
    }

    fn sample() -> Vec<Record> {
        vec![
            Record::new("kv/a/1", &b"one"[..]),
            Record::new("kv/a/2", &b"two"[..]),
            Record::new("kv/b/1", &b"three"[..]),
        ]
    }

    #[test]
    fn decodes_records_in_order() {
        let data = frame(&sample());
        let decoded: Vec<Record> = DelimitedReader::new(data.as_slice())
            .collect::<StreamResult<_>>()
            .unwrap();
        assert_eq!(decoded, sample());
    }

    #[test]
    fn summary_counts_records_and_bytes() {
        let data = frame(&sample());
        let summary = read_records(data.as_slice(), MAX_RECORD_SIZE, |_| Ok(())).unwrap();
        assert_eq!(summary.records, 3);
        assert_eq!(summary.bytes, data.len() as u64);
    }

    #[test]
    fn empty_stream_has_no_records() {
        let mut reader = DelimitedReader::new(&[][..]);
        assert!(reader.read_record().unwrap().is_none());
        assert_eq!(reader.summary(), DecodeSummary::default());
    }

    #[test]
    fn zero_length_frame_is_an_empty_record() {
        let mut reader = DelimitedReader::new(&[0u8][..]);
        let record = reader.read_record().unwrap().unwrap();
        assert!(record.key.is_empty());
        assert!(reader.read_record().unwrap().is_none());
    }

    #[test]
    fn multi_byte_length_prefix() {
        let big = Record::new("big", vec![0x5a; 300]);
        let data = frame(&[big.clone()]);
        assert!(data[0] & 0x80 != 0);
        let mut reader = DelimitedReader::new(data.as_slice());
        assert_eq!(reader.read_record().unwrap(), Some(big));
    }

    #[test]
    fn truncated_body_is_an_error() {
        let mut data = frame(&sample());
        data.truncate(data.len() - 2);
        let results: Vec<_> = DelimitedReader::new(data.as_slice()).collect();
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[1].is_ok());
        assert!(matches!(
            results[2],
            Err(StreamError::TruncatedFrame { .. })
        ));
    }

    #[test]
    fn truncated_length_prefix_is_an_error() {
        let err = DelimitedReader::new(&[0x80u8][..]).read_record().unwrap_err();
        assert!(matches!(
            err,
            StreamError::TruncatedFrame {
                offset: 0,
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn oversized_frame_is_rejected_before_reading() {
        let mut data = Vec::new();
        prost::encoding::encode_varint(1_000, &mut data);
        let err = DelimitedReader::with_max_size(data.as_slice(), 999)
            .read_record()
            .unwrap_err();
        assert!(matches!(
            err,
            StreamError::FrameTooLarge {
                len: 1_000,
                max: 999,
                ..
            }
        ));
    }

    #[test]
    fn default_limit_is_i32_max() {
        let mut data = Vec::new();
        prost::encoding::encode_varint(i32::MAX as u64 + 1, &mut data);
        let err = DelimitedReader::new(data.as_slice()).read_record().unwrap_err();
        assert!(matches!(err, StreamError::FrameTooLarge { .. }));
    }

    #[test]
    fn varint_overflow_is_rejected() {
        let data = [0xffu8; 11];
        let err = DelimitedReader::new(&data[..]).read_record().unwrap_err();
        assert!(matches!(err, StreamError::VarintOverflow { offset: 0 }));
    }

    #[test]
    fn mid_stream_garbage_stops_without_phantom_record() {
        let mut data = frame(&sample()[..1]);
        // One-byte body with an invalid wire type.
        data.extend_from_slice(&[1, 0x0f]);
        data.extend_from_slice(&frame(&sample()[1..]));

        let mut delivered = Vec::new();
        let err = read_records(data.as_slice(), MAX_RECORD_SIZE, |record| {
            delivered.push(record);
            Ok(())
        })
        .unwrap_err();

        assert!(matches!(err, StreamError::Decode { .. }));
        assert_eq!(delivered, sample()[..1].to_vec());
    }

    #[test]
    fn iterator_is_fused_after_error() {
        let mut reader = DelimitedReader::new(&[0x80u8][..]);
        assert!(matches!(reader.next(), Some(Err(_))));
        assert!(reader.next().is_none());
    }

    #[test]
    fn handler_error_stops_the_pass() {
        let data = frame(&sample());
        let mut seen = 0;
        let err = read_records(data.as_slice(), MAX_RECORD_SIZE, |_| {
            seen += 1;
            Err(StreamError::Cancelled { records: seen })
        })
        .unwrap_err();
        assert!(matches!(err, StreamError::Cancelled { records: 1 }));
        assert_eq!(seen, 1);
    }
}
