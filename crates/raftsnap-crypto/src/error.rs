use std::fmt;

use raftsnap_types::Sha256Digest;

/// Failure kind of an [`IntegrityError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IntegrityFailure {
    Parse,
    UnknownFile,
    DigestMismatch,
    MissingFile,
}

impl fmt::Display for IntegrityFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Parse => "parse",
            Self::UnknownFile => "unknown-file",
            Self::DigestMismatch => "digest-mismatch",
            Self::MissingFile => "missing-file",
        };
        f.write_str(s)
    }
}

/// Terminal verification failure. Never downgraded to a warning.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum IntegrityError {
    /// A manifest line did not match `<64 hex>  <name>`.
    #[error("malformed manifest line {line}: {reason}")]
    Parse { line: usize, reason: String },

    /// The manifest names a file the ledger does not track.
    #[error("list missing hash for {file:?}")]
    UnknownFile { file: String },

    /// Computed digest differs from the manifest.
    #[error("hash check failed for {file:?}: manifest {expected}, computed {actual}")]
    DigestMismatch {
        file: String,
        expected: Sha256Digest,
        actual: Sha256Digest,
    },

    /// A tracked file never appeared in the manifest.
    #[error("file missing for {file:?}")]
    MissingFile { file: String },
}

impl IntegrityError {
    pub fn kind(&self) -> IntegrityFailure {
        match self {
            Self::Parse { .. } => IntegrityFailure::Parse,
            Self::UnknownFile { .. } => IntegrityFailure::UnknownFile,
            Self::DigestMismatch { .. } => IntegrityFailure::DigestMismatch,
            Self::MissingFile { .. } => IntegrityFailure::MissingFile,
        }
    }

    /// The offending file, when the failure is attributable to one.
    pub fn file(&self) -> Option<&str> {
        match self {
            Self::Parse { .. } => None,
            Self::UnknownFile { file }
            | Self::DigestMismatch { file, .. }
            | Self::MissingFile { file } => Some(file),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_render_as_tags() {
        assert_eq!(IntegrityFailure::Parse.to_string(), "parse");
        assert_eq!(IntegrityFailure::UnknownFile.to_string(), "unknown-file");
        assert_eq!(IntegrityFailure::DigestMismatch.to_string(), "digest-mismatch");
        assert_eq!(IntegrityFailure::MissingFile.to_string(), "missing-file");
    }

    #[test]
    fn file_is_named() {
        let err = IntegrityError::MissingFile {
            file: "state.bin".into(),
        };
        assert_eq!(err.file(), Some("state.bin"));
        assert_eq!(err.kind(), IntegrityFailure::MissingFile);
        assert!(err.to_string().contains("state.bin"));

        let parse = IntegrityError::Parse {
            line: 2,
            reason: "bad".into(),
        };
        assert_eq!(parse.file(), None);
    }
}
