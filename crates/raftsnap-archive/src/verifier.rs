use std::fs::File;
use std::io::{BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use raftsnap_crypto::HashLedger;
use raftsnap_types::SnapshotMetadata;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::demux::demultiplex;
use crate::entry::EntryKind;
use crate::error::{ArchiveError, ArchiveResult};

const SCRATCH_PREFIX: &str = "snapshot";
const SCRATCH_BUF: usize = 1 << 20;

/// A snapshot whose `meta.json` and `state.bin` matched `SHA256SUMS`.
///
/// Owns the scratch file holding `state.bin`, rewound to its start. The file is
/// removed on [`close`](Self::close), or on drop if `close` is never called.
#[derive(Debug)]
pub struct VerifiedSnapshot {
    metadata: SnapshotMetadata,
    state: NamedTempFile,
    state_len: u64,
    sealed_sums: Option<Vec<u8>>,
}

impl VerifiedSnapshot {
    pub fn metadata(&self) -> &SnapshotMetadata {
        &self.metadata
    }

    /// Size of `state.bin` in bytes.
    pub fn state_len(&self) -> u64 {
        self.state_len
    }

    /// Location of the scratch file.
    pub fn state_path(&self) -> &Path {
        self.state.path()
    }

    /// Raw `SHA256SUMS.sealed` bytes. Present but never verified.
    pub fn sealed_sums(&self) -> Option<&[u8]> {
        self.sealed_sums.as_deref()
    }

    /// An independent handle on the scratch file, positioned at its start.
    pub fn open_state(&self) -> ArchiveResult<File> {
        let mut file = self
            .state
            .reopen()
            .map_err(ArchiveError::io("reopen temp snapshot"))?;
        file.seek(SeekFrom::Start(0))
            .map_err(ArchiveError::io("rewind temp snapshot"))?;
        Ok(file)
    }

    /// Remove the scratch file, reporting failure instead of ignoring it.
    pub fn close(self) -> ArchiveResult<()> {
        let path = self.state.path().to_path_buf();
        self.state
            .close()
            .map_err(ArchiveError::io("clean up temp snapshot"))?;
        debug!(path = %path.display(), "scratch file removed");
        Ok(())
    }
}

/// Reads a snapshot archive into a scratch file and checks its integrity.
#[derive(Clone, Debug, Default)]
pub struct SnapshotVerifier {
    scratch_dir: Option<PathBuf>,
}

impl SnapshotVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create scratch files in `dir` instead of the system temp directory.
    pub fn with_scratch_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            scratch_dir: Some(dir.into()),
        }
    }

    /// Demultiplex and verify `input`.
    ///
    /// Any failure is fatal; the scratch file is removed before returning an
    /// error.
    pub fn verify<R: Read>(&self, input: R) -> ArchiveResult<VerifiedSnapshot> {
        let scratch = self.scratch_file()?;

        let mut ledger = HashLedger::new();
        for kind in EntryKind::ALL.into_iter().filter(EntryKind::is_hashed) {
            ledger.track(kind.name());
        }

        let mut sink = BufWriter::with_capacity(SCRATCH_BUF, scratch.as_file());
        let out = demultiplex(input, &mut ledger, &mut sink)?;
        sink.flush()
            .map_err(ArchiveError::io("write temp snapshot"))?;
        drop(sink);

        ledger.verify(&out.sums)?;
        let metadata = SnapshotMetadata::from_json(&out.meta).map_err(ArchiveError::Metadata)?;
        info!(
            id = %metadata.id,
            index = metadata.index,
            term = metadata.term,
            state_bytes = out.state_bytes,
            "snapshot integrity verified"
        );

        if out.sealed_sums.is_some() {
            // Sealed manifests need the node's seal to open; not checked here.
            info!("SHA256SUMS.sealed present; sealed verification is not implemented");
        }

        let mut file = scratch.as_file();
        file.sync_all()
            .map_err(ArchiveError::io("sync temp snapshot"))?;
        file.seek(SeekFrom::Start(0))
            .map_err(ArchiveError::io("rewind temp snapshot"))?;

        Ok(VerifiedSnapshot {
            metadata,
            state: scratch,
            state_len: out.state_bytes,
            sealed_sums: out.sealed_sums,
        })
    }

    fn scratch_file(&self) -> ArchiveResult<NamedTempFile> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(SCRATCH_PREFIX);
        let file = match &self.scratch_dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        };
        file.map_err(ArchiveError::io("create temp snapshot file"))
    }
}
