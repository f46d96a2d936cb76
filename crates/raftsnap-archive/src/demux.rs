use std::collections::HashSet;
use std::io::{self, BufRead, BufReader, Read, Write};

use flate2::bufread::GzDecoder;
use raftsnap_crypto::{HashLedger, HashingReader, HashingWriter};
use tracing::debug;

use crate::entry::{EntryKind, MAX_SEALED_SUMS_SIZE};
use crate::error::{ArchiveError, ArchiveResult};

const TAR_BLOCK: usize = 512;
const INPUT_BUF: usize = 64 * 1024;

/// Everything the demultiplexer keeps in memory after one archive walk.
#[derive(Clone, Debug, Default)]
pub struct DemuxOutput {
    /// Raw `meta.json` bytes. Hashed, not parsed: they are untrusted until
    /// the manifest has been checked.
    pub meta: Vec<u8>,
    /// Raw `SHA256SUMS` text.
    pub sums: Vec<u8>,
    /// Raw `SHA256SUMS.sealed` bytes, if the entry was present.
    pub sealed_sums: Option<Vec<u8>>,
    /// Bytes of `state.bin` written to the state sink.
    pub state_bytes: u64,
}

/// Decompress `input`, walk its tar entries, and route each one by name.
///
/// `meta.json` and `state.bin` are fed through `ledger` (the same handles
/// [`HashLedger::track`] returns for those names); `state.bin` is copied to
/// `state_sink` without being buffered in memory. After the last entry the
/// decompressor is drained and must hold nothing beyond the tar trailer, and
/// the compressed input must end with the gzip member.
pub fn demultiplex<R: Read, W: Write>(
    input: R,
    ledger: &mut HashLedger,
    state_sink: &mut W,
) -> ArchiveResult<DemuxOutput> {
    let mut decoder = GzDecoder::new(BufReader::with_capacity(INPUT_BUF, input));
    let mut seen = HashSet::new();
    let mut out = DemuxOutput::default();

    {
        let mut archive = tar::Archive::new(&mut decoder);
        let entries = archive
            .entries()
            .map_err(ArchiveError::io("read snapshot archive"))?;

        for entry in entries {
            let mut entry = entry.map_err(ArchiveError::io("read snapshot archive"))?;
            let kind = match EntryKind::from_name(&entry.path_bytes()) {
                Some(kind) => kind,
                None => {
                    return Err(ArchiveError::UnexpectedEntry {
                        name: String::from_utf8_lossy(&entry.path_bytes()).into_owned(),
                    })
                }
            };
            if !seen.insert(kind) {
                return Err(ArchiveError::DuplicateEntry { name: kind.name() });
            }
            debug!(entry = kind.name(), size = entry.size(), "routing archive entry");

            match kind {
                EntryKind::Meta => {
                    let handle = ledger.track(kind.name());
                    HashingReader::new(&mut entry, ledger, handle)
                        .read_to_end(&mut out.meta)
                        .map_err(ArchiveError::io("read snapshot metadata"))?;
                }
                EntryKind::State => {
                    let handle = ledger.track(kind.name());
                    let mut sink = HashingWriter::new(&mut *state_sink, ledger, handle);
                    out.state_bytes = io::copy(&mut entry, &mut sink)
                        .map_err(ArchiveError::io("read or write snapshot data"))?;
                    sink.flush()
                        .map_err(ArchiveError::io("read or write snapshot data"))?;
                }
                EntryKind::Sums => {
                    entry
                        .read_to_end(&mut out.sums)
                        .map_err(ArchiveError::io("read snapshot hashes"))?;
                }
                EntryKind::SealedSums => {
                    let mut buf = Vec::new();
                    copy_eof_or_n(&mut entry, &mut buf, kind.name(), MAX_SEALED_SUMS_SIZE)?;
                    out.sealed_sums = Some(buf);
                }
            }
        }
    }

    if let Some(missing) = EntryKind::ALL
        .into_iter()
        .find(|kind| kind.is_required() && !seen.contains(kind))
    {
        return Err(ArchiveError::MissingEntry {
            name: missing.name(),
        });
    }

    conclude_gzip_read(decoder)?;

    debug!(
        state_bytes = out.state_bytes,
        sums_bytes = out.sums.len(),
        sealed = out.sealed_sums.is_some(),
        "archive demultiplexed"
    );
    Ok(out)
}

/// Copy until EOF or `max` bytes. Reaching `max` means the entry was cut off.
fn copy_eof_or_n<R: Read, W: Write>(
    src: &mut R,
    dst: &mut W,
    name: &'static str,
    max: u64,
) -> ArchiveResult<u64> {
    let copied = io::copy(&mut src.take(max), dst)
        .map_err(ArchiveError::io("read snapshot hashes"))?;
    if copied == max {
        return Err(ArchiveError::PossibleTruncation { name, max });
    }
    Ok(copied)
}

/// Drain the decompressor after the tar walk.
///
/// Decompressed output is only trustworthy once the gzip footer has been
/// checked, which happens when the decoder reports EOF. The only bytes allowed
/// after the tar reader stops are the second zero block of the end-of-archive
/// marker.
fn conclude_gzip_read<R: BufRead>(mut decoder: GzDecoder<R>) -> ArchiveResult<()> {
    let mut rest = Vec::new();
    decoder
        .read_to_end(&mut rest)
        .map_err(ArchiveError::io("drain snapshot decompressor"))?;

    let unread = unread_after_terminator(&rest);
    if unread != 0 {
        return Err(ArchiveError::UnreadBytes {
            count: unread as u64,
            layer: "uncompressed",
        });
    }

    let mut input = decoder.into_inner();
    let trailing = io::copy(&mut input, &mut io::sink())
        .map_err(ArchiveError::io("drain snapshot input"))?;
    if trailing != 0 {
        return Err(ArchiveError::UnreadBytes {
            count: trailing,
            layer: "compressed",
        });
    }
    Ok(())
}

fn unread_after_terminator(rest: &[u8]) -> usize {
    match rest.get(..TAR_BLOCK) {
        Some(block) if block.iter().all(|b| *b == 0) => rest.len() - TAR_BLOCK,
        _ => rest.len(),
    }
}

#[cfg(test)]
mod tests {
    use raftsnap_testkit::{gzip, tar_entries, SnapshotFixture};

    use super::*;

    fn run(archive: &[u8]) -> (ArchiveResult<DemuxOutput>, HashLedger, Vec<u8>) {
        let mut ledger = HashLedger::new();
        let mut state = Vec::new();
        let result = demultiplex(archive, &mut ledger, &mut state);
        (result, ledger, state)
    }

    #[test]
    fn routes_all_entries() {
        let fixture = SnapshotFixture::new()
            .record("kv/a/1", b"one")
            .record("kv/a/2", b"two")
            .sealed_sums(b"opaque".to_vec());
        let (result, ledger, state) = run(&fixture.build());
        let out = result.unwrap();

        assert_eq!(out.meta, fixture.meta_bytes());
        assert_eq!(state, fixture.state_bytes());
        assert_eq!(out.state_bytes, state.len() as u64);
        assert_eq!(out.sums, fixture.sums().into_bytes());
        assert_eq!(out.sealed_sums.as_deref(), Some(&b"opaque"[..]));
        ledger.verify(&out.sums).unwrap();
    }

    #[test]
    fn entry_order_does_not_matter() {
        let fixture = SnapshotFixture::new().record("k", b"v");
        let reversed = fixture.entries().into_iter().rev().collect::<Vec<_>>();
        let (result, ledger, _) = run(&gzip(&tar_entries(&reversed)));
        let out = result.unwrap();
        ledger.verify(&out.sums).unwrap();
    }

    #[test]
    fn unexpected_entry_is_rejected_in_any_position() {
        let fixture = SnapshotFixture::new();
        let base = fixture.entries();
        for pos in 0..=base.len() {
            let mut entries = base.clone();
            entries.insert(pos, ("notes.txt".to_string(), b"hi".to_vec()));
            let (result, _, _) = run(&gzip(&tar_entries(&entries)));
            match result {
                Err(ArchiveError::UnexpectedEntry { name }) => assert_eq!(name, "notes.txt"),
                other => panic!("expected unexpected-entry error, got {other:?}"),
            }
        }
    }

    #[test]
    fn duplicate_entry_is_rejected() {
        let fixture = SnapshotFixture::new();
        let mut entries = fixture.entries();
        entries.push(("state.bin".to_string(), Vec::new()));
        let (result, _, _) = run(&gzip(&tar_entries(&entries)));
        assert!(matches!(
            result,
            Err(ArchiveError::DuplicateEntry { name: "state.bin" })
        ));
    }

    #[test]
    fn missing_state_is_rejected() {
        let fixture = SnapshotFixture::new();
        let entries: Vec<_> = fixture
            .entries()
            .into_iter()
            .filter(|(name, _)| name != "state.bin")
            .collect();
        let (result, _, _) = run(&gzip(&tar_entries(&entries)));
        assert!(matches!(
            result,
            Err(ArchiveError::MissingEntry { name: "state.bin" })
        ));
    }

    #[test]
    fn metadata_is_not_parsed_during_the_walk() {
        let fixture = SnapshotFixture::new().raw_meta(b"{not json".to_vec());
        let (result, _, _) = run(&fixture.build());
        assert_eq!(result.unwrap().meta, b"{not json");
    }

    #[test]
    fn sealed_sums_at_cap_is_truncation() {
        let fixture = SnapshotFixture::new().sealed_sums(vec![7u8; MAX_SEALED_SUMS_SIZE as usize]);
        let (result, _, _) = run(&fixture.build());
        assert!(matches!(
            result,
            Err(ArchiveError::PossibleTruncation { max: 8192, .. })
        ));
    }

    #[test]
    fn sealed_sums_below_cap_is_kept() {
        let fixture =
            SnapshotFixture::new().sealed_sums(vec![7u8; MAX_SEALED_SUMS_SIZE as usize - 1]);
        let (result, _, _) = run(&fixture.build());
        assert_eq!(result.unwrap().sealed_sums.map(|s| s.len()), Some(8191));
    }

    #[test]
    fn uncompressed_trailing_bytes_are_rejected() {
        let fixture = SnapshotFixture::new();
        let mut tar = tar_entries(&fixture.entries());
        tar.extend_from_slice(&[0xAA; 100]);
        let (result, _, _) = run(&gzip(&tar));
        assert!(matches!(
            result,
            Err(ArchiveError::UnreadBytes { layer: "uncompressed", .. })
        ));
    }

    #[test]
    fn compressed_trailing_bytes_are_rejected() {
        let mut archive = SnapshotFixture::new().build();
        archive.extend_from_slice(b"garbage");
        let (result, _, _) = run(&archive);
        match result {
            Err(ArchiveError::UnreadBytes { count, layer }) => {
                assert_eq!(count, 7);
                assert_eq!(layer, "compressed");
            }
            other => panic!("expected unread-bytes error, got {other:?}"),
        }
    }

    #[test]
    fn not_gzip_is_an_io_error() {
        let (result, _, _) = run(b"definitely not a gzip stream");
        assert!(matches!(result, Err(ArchiveError::Io { .. })));
    }

    #[test]
    fn terminator_accounting() {
        assert_eq!(unread_after_terminator(&[]), 0);
        assert_eq!(unread_after_terminator(&[0; 512]), 0);
        assert_eq!(unread_after_terminator(&[0; 600]), 88);
        assert_eq!(unread_after_terminator(&[1; 512]), 512);
        assert_eq!(unread_after_terminator(&[0; 100]), 100);
    }
}
