//! Snapshot archive fixtures for raftsnap tests.
//!
//! [`SnapshotFixture`] builds a real gzip-compressed tar archive with the
//! `meta.json`, `state.bin`, and `SHA256SUMS` entries a raft node writes, and
//! can break it in controlled ways: flipped bytes, replaced manifests, raw
//! metadata, trailing garbage in the record stream.

use std::io::Write;
use std::path::Path;

use flate2::write::GzEncoder;
use flate2::Compression;
use prost::Message;
use raftsnap_crypto::HashLedger;
use raftsnap_stream::Record;
use raftsnap_types::{SnapshotMetadata, SnapshotVersion};

pub const META: &str = "meta.json";
pub const STATE: &str = "state.bin";
pub const SUMS: &str = "SHA256SUMS";
pub const SEALED_SUMS: &str = "SHA256SUMS.sealed";

/// Builder for one snapshot archive.
#[derive(Clone, Debug)]
pub struct SnapshotFixture {
    metadata: SnapshotMetadata,
    raw_meta: Option<Vec<u8>>,
    records: Vec<Record>,
    state_suffix: Vec<u8>,
    sealed_sums: Option<Vec<u8>>,
    flip_state_at: Option<usize>,
    tampered_meta: Option<Vec<u8>>,
    sums_override: Option<String>,
}

impl Default for SnapshotFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotFixture {
    /// An empty snapshot with metadata `ID=abc, Index=5, Term=2, Version=1, Size=42`.
    pub fn new() -> Self {
        Self {
            metadata: SnapshotMetadata {
                id: "abc".to_string(),
                size: 42,
                index: 5,
                term: 2,
                version: SnapshotVersion(1),
            },
            raw_meta: None,
            records: Vec::new(),
            state_suffix: Vec::new(),
            sealed_sums: None,
            flip_state_at: None,
            tampered_meta: None,
            sums_override: None,
        }
    }

    pub fn with_metadata(mut self, metadata: SnapshotMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn record(mut self, key: impl Into<Vec<u8>>, value: &[u8]) -> Self {
        self.records.push(Record::new(key, bytes::Bytes::copy_from_slice(value)));
        self
    }

    /// Use `bytes` verbatim as `meta.json`. The manifest covers them.
    pub fn raw_meta(mut self, bytes: Vec<u8>) -> Self {
        self.raw_meta = Some(bytes);
        self
    }

    /// Append raw bytes to `state.bin` after the encoded records. The
    /// manifest covers them.
    pub fn state_suffix(mut self, bytes: &[u8]) -> Self {
        self.state_suffix.extend_from_slice(bytes);
        self
    }

    pub fn sealed_sums(mut self, bytes: Vec<u8>) -> Self {
        self.sealed_sums = Some(bytes);
        self
    }

    /// Flip the byte at `offset` in `state.bin` after the manifest is computed.
    pub fn tamper_state(mut self, offset: usize) -> Self {
        self.flip_state_at = Some(offset);
        self
    }

    /// Ship `bytes` as `meta.json` while the manifest still describes the
    /// fixture's own metadata.
    pub fn tamper_meta(mut self, bytes: Vec<u8>) -> Self {
        self.tampered_meta = Some(bytes);
        self
    }

    /// Ship `sums` as `SHA256SUMS` instead of the computed manifest.
    pub fn override_sums(mut self, sums: String) -> Self {
        self.sums_override = Some(sums);
        self
    }

    pub fn metadata(&self) -> &SnapshotMetadata {
        &self.metadata
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// `meta.json` as the manifest sees it.
    pub fn meta_bytes(&self) -> Vec<u8> {
        match &self.raw_meta {
            Some(raw) => raw.clone(),
            None => self
                .metadata
                .to_json()
                .expect("snapshot metadata always encodes"),
        }
    }

    /// `state.bin` as the manifest sees it.
    pub fn state_bytes(&self) -> Vec<u8> {
        let mut out = frame_records(&self.records);
        out.extend_from_slice(&self.state_suffix);
        out
    }

    /// The `SHA256SUMS` text that will be shipped.
    pub fn sums(&self) -> String {
        if let Some(sums) = &self.sums_override {
            return sums.clone();
        }
        let mut ledger = HashLedger::new();
        let meta = ledger.track(META);
        ledger.feed(meta, &self.meta_bytes());
        let state = ledger.track(STATE);
        ledger.feed(state, &self.state_bytes());
        ledger.encode()
    }

    /// Archive entries in the order a raft node writes them.
    pub fn entries(&self) -> Vec<(String, Vec<u8>)> {
        let meta = self
            .tampered_meta
            .clone()
            .unwrap_or_else(|| self.meta_bytes());
        let mut state = self.state_bytes();
        if let Some(offset) = self.flip_state_at {
            state[offset] ^= 0xff;
        }

        let mut entries = vec![
            (META.to_string(), meta),
            (STATE.to_string(), state),
            (SUMS.to_string(), self.sums().into_bytes()),
        ];
        if let Some(sealed) = &self.sealed_sums {
            entries.push((SEALED_SUMS.to_string(), sealed.clone()));
        }
        entries
    }

    /// The complete `.tar.gz` archive.
    pub fn build(&self) -> Vec<u8> {
        gzip(&tar_entries(&self.entries()))
    }

    pub fn write_to(&self, path: &Path) -> std::io::Result<()> {
        std::fs::write(path, self.build())
    }
}

/// Encode records with varint length prefixes, as `state.bin` stores them.
pub fn frame_records(records: &[Record]) -> Vec<u8> {
    let mut out = Vec::new();
    for record in records {
        record
            .encode_length_delimited(&mut out)
            .expect("Vec has unlimited capacity");
    }
    out
}

/// A tar stream holding `entries` in order, with the end-of-archive marker.
pub fn tar_entries(entries: &[(String, Vec<u8>)]) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());
    for (name, data) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_path(name).expect("fixture entry name is a valid path");
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append(&header, data.as_slice())
            .expect("in-memory tar write");
    }
    builder.into_inner().expect("in-memory tar finish")
}

/// A single gzip member wrapping `data`.
pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).expect("in-memory gzip write");
    encoder.finish().expect("in-memory gzip finish")
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use flate2::read::GzDecoder;

    use super::*;

    #[test]
    fn archive_lists_entries_in_order() {
        let fixture = SnapshotFixture::new()
            .record("kv/a", b"1")
            .sealed_sums(b"sealed".to_vec());
        let archive = fixture.build();

        let mut tar = tar::Archive::new(GzDecoder::new(archive.as_slice()));
        let mut names = Vec::new();
        for entry in tar.entries().unwrap() {
            let mut entry = entry.unwrap();
            let mut data = Vec::new();
            entry.read_to_end(&mut data).unwrap();
            names.push(entry.path().unwrap().to_string_lossy().into_owned());
        }
        assert_eq!(names, vec![META, STATE, SUMS, SEALED_SUMS]);
    }

    #[test]
    fn sums_cover_meta_and_state() {
        let fixture = SnapshotFixture::new().record("k", b"v");
        let sums = fixture.sums();
        let lines: Vec<&str> = sums.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("  meta.json"));
        assert!(lines[1].ends_with("  state.bin"));
    }

    #[test]
    fn tampering_changes_shipped_bytes_only() {
        let fixture = SnapshotFixture::new().record("k", b"v");
        let clean = fixture.entries();
        let tampered = fixture.clone().tamper_state(0).entries();
        assert_ne!(clean[1].1, tampered[1].1);
        assert_eq!(clean[2].1, tampered[2].1);
    }
}
