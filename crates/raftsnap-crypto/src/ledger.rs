use std::collections::{BTreeMap, BTreeSet};

use raftsnap_types::Sha256Digest;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::IntegrityError;
use crate::manifest::{parse_manifest, ManifestLine};

/// Handle to one tracked file's running digest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DigestHandle(usize);

struct TrackedFile {
    name: String,
    hasher: Sha256,
}

/// Named set of expected files and their running SHA-256 digests.
///
/// Files are registered up front with [`track`](Self::track), fed every byte
/// of their content as it streams past, and finally checked against a
/// `SHA256SUMS` manifest with [`verify`](Self::verify). Verification requires
/// set equality: every manifest entry must be tracked and match, and every
/// tracked file must appear in the manifest.
#[derive(Default)]
pub struct HashLedger {
    files: Vec<TrackedFile>,
    by_name: BTreeMap<String, DigestHandle>,
}

impl HashLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name`. Repeated calls return the same handle.
    pub fn track(&mut self, name: &str) -> DigestHandle {
        if let Some(handle) = self.by_name.get(name) {
            return *handle;
        }
        let handle = DigestHandle(self.files.len());
        self.files.push(TrackedFile {
            name: name.to_string(),
            hasher: Sha256::new(),
        });
        self.by_name.insert(name.to_string(), handle);
        handle
    }

    /// Handle for an already tracked file.
    pub fn handle(&self, name: &str) -> Option<DigestHandle> {
        self.by_name.get(name).copied()
    }

    /// Feed the next chunk of a tracked file's content.
    ///
    /// # Panics
    ///
    /// Panics if `handle` was not returned by this ledger's [`track`](Self::track).
    pub fn feed(&mut self, handle: DigestHandle, bytes: &[u8]) {
        self.files[handle.0].hasher.update(bytes);
    }

    /// Digest over everything fed so far. Does not consume the running state.
    ///
    /// Panics on a foreign handle, like [`feed`](Self::feed).
    pub fn finalize_digest(&self, handle: DigestHandle) -> Sha256Digest {
        let digest = self.files[handle.0].hasher.clone().finalize();
        Sha256Digest::from_hash(digest.into())
    }

    /// Name a handle was registered under. Panics on a foreign handle.
    pub fn name(&self, handle: DigestHandle) -> &str {
        &self.files[handle.0].name
    }

    /// Tracked file names in lexical order.
    pub fn tracked(&self) -> impl Iterator<Item = &str> {
        self.by_name.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Check every tracked digest against `manifest` (`SHA256SUMS` text).
    ///
    /// A file listed twice is a parse error, even when both digests agree.
    pub fn verify(&self, manifest: &[u8]) -> Result<(), IntegrityError> {
        let lines = parse_manifest(manifest)?;
        let mut seen = BTreeSet::new();

        for (i, line) in lines.iter().enumerate() {
            if !seen.insert(line.file.as_str()) {
                return Err(IntegrityError::Parse {
                    line: i + 1,
                    reason: format!("duplicate entry for {:?}", line.file),
                });
            }
            let handle = self
                .handle(&line.file)
                .ok_or_else(|| IntegrityError::UnknownFile {
                    file: line.file.clone(),
                })?;
            let actual = self.finalize_digest(handle);
            if actual != line.digest {
                return Err(IntegrityError::DigestMismatch {
                    file: line.file.clone(),
                    expected: line.digest,
                    actual,
                });
            }
        }

        if let Some(missing) = self.tracked().find(|name| !seen.contains(name)) {
            return Err(IntegrityError::MissingFile {
                file: missing.to_string(),
            });
        }

        debug!(files = self.len(), "manifest verified");
        Ok(())
    }

    /// Render the current digests as `SHA256SUMS` text, sorted by name.
    pub fn encode(&self) -> String {
        self.by_name
            .iter()
            .map(|(name, handle)| {
                let line = ManifestLine {
                    digest: self.finalize_digest(*handle),
                    file: name.clone(),
                };
                format!("{}\n", line.render())
            })
            .collect()
    }
}
