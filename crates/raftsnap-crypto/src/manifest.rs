use raftsnap_types::Sha256Digest;

use crate::error::IntegrityError;

/// Separator between digest and file name in a `SHA256SUMS` line.
pub const SEPARATOR: &str = "  ";

/// One parsed `SHA256SUMS` line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ManifestLine {
    pub digest: Sha256Digest,
    pub file: String,
}

impl ManifestLine {
    /// Render as `<hex>  <file>` (no trailing newline).
    pub fn render(&self) -> String {
        format!("{}{SEPARATOR}{}", self.digest.to_hex(), self.file)
    }
}

/// Parse manifest text into lines. Line numbers in errors are 1-based.
///
/// Every line, including a blank one, must be `<64 hex chars>  <name>` where
/// `name` is non-empty and contains no whitespace. A final newline is optional.
pub fn parse_manifest(text: &[u8]) -> Result<Vec<ManifestLine>, IntegrityError> {
    let text = std::str::from_utf8(text).map_err(|e| IntegrityError::Parse {
        line: 0,
        reason: format!("manifest is not UTF-8: {e}"),
    })?;

    text.lines()
        .enumerate()
        .map(|(i, line)| parse_line(i + 1, line))
        .collect()
}

fn parse_line(line_no: usize, line: &str) -> Result<ManifestLine, IntegrityError> {
    let parse_err = |reason: String| IntegrityError::Parse {
        line: line_no,
        reason,
    };

    let (hex, file) = line
        .split_once(SEPARATOR)
        .ok_or_else(|| parse_err(format!("expected \"<digest>{SEPARATOR}<file>\", got {line:?}")))?;

    let digest = Sha256Digest::from_hex(hex).map_err(|e| parse_err(e.to_string()))?;

    if file.is_empty() || file.chars().any(char::is_whitespace) {
        return Err(parse_err(format!("invalid file name {file:?}")));
    }

    Ok(ManifestLine {
        digest,
        file: file.to_string(),
    })
}
