use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Raft snapshot format version.
///
/// Stored in `meta.json` as a bare integer. Values outside the known range are
/// preserved rather than rejected; the inspector reports what the archive says.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SnapshotVersion(pub i64);

impl SnapshotVersion {
    /// Oldest snapshot version a raft node can produce.
    pub const MIN: Self = Self(0);
    /// Newest snapshot version a raft node can produce.
    pub const MAX: Self = Self(1);

    /// Returns `true` if the version lies in `MIN..=MAX`.
    pub fn is_known(&self) -> bool {
        (Self::MIN..=Self::MAX).contains(self)
    }
}

impl fmt::Display for SnapshotVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of a raft snapshot, parsed from the archive's `meta.json`.
///
/// Field names follow the raft library's JSON encoding. Fields the inspector
/// does not use (`Peers`, `Configuration`, `ConfigurationIndex`) are ignored;
/// missing fields decode to their zero value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    #[serde(rename = "ID", default)]
    pub id: String,
    #[serde(rename = "Size", default)]
    pub size: i64,
    #[serde(rename = "Index", default)]
    pub index: u64,
    #[serde(rename = "Term", default)]
    pub term: u64,
    #[serde(rename = "Version", default)]
    pub version: SnapshotVersion,
}

impl SnapshotMetadata {
    /// Decode from the complete bytes of a `meta.json` entry.
    pub fn from_json(data: &[u8]) -> Result<Self, TypeError> {
        serde_json::from_slice(data).map_err(|e| TypeError::Serialization(e.to_string()))
    }

    /// Encode as the compact JSON a raft node writes into `meta.json`.
    pub fn to_json(&self) -> Result<Vec<u8>, TypeError> {
        serde_json::to_vec(self).map_err(|e| TypeError::Serialization(e.to_string()))
    }
}
