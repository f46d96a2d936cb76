/// Largest `SHA256SUMS.sealed` entry the reader accepts.
pub const MAX_SEALED_SUMS_SIZE: u64 = 8192;

/// The closed set of entries a snapshot archive may contain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// `meta.json`
    Meta,
    /// `state.bin`
    State,
    /// `SHA256SUMS`
    Sums,
    /// `SHA256SUMS.sealed`
    SealedSums,
}

impl EntryKind {
    pub const ALL: [EntryKind; 4] = [Self::Meta, Self::State, Self::Sums, Self::SealedSums];

    /// Entry name inside the tar stream.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Meta => "meta.json",
            Self::State => "state.bin",
            Self::Sums => "SHA256SUMS",
            Self::SealedSums => "SHA256SUMS.sealed",
        }
    }

    /// Match an exact tar entry name. Anything else is not part of the format.
    pub fn from_name(name: &[u8]) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name().as_bytes() == name)
    }

    /// Returns `true` for entries whose digests the manifest lists.
    pub fn is_hashed(&self) -> bool {
        matches!(self, Self::Meta | Self::State)
    }

    /// Returns `true` for entries every archive must contain.
    pub fn is_required(&self) -> bool {
        !matches!(self, Self::SealedSums)
    }
}
