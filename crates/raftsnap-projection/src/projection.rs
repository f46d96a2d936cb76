use std::collections::BTreeMap;
use std::sync::Arc;

use bytes::Bytes;

type Entries = BTreeMap<Vec<u8>, Option<Bytes>>;

/// Immutable ordered mapping from record key to an optional value.
///
/// `None` is the placeholder stored when values are not retained. Cloning is
/// cheap; clones share structure until a transaction writes to one of them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OrderedProjection {
    entries: Arc<Entries>,
}

impl OrderedProjection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a transaction on top of this projection.
    ///
    /// Writes go to a private copy; `self` never changes.
    pub fn begin(&self) -> ProjectionTxn {
        ProjectionTxn {
            entries: Arc::clone(&self.entries),
            writes: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.entries.contains_key(key)
    }

    /// The stored value for `key`: `Some(None)` for a placeholder.
    pub fn get(&self, key: &[u8]) -> Option<Option<&Bytes>> {
        self.entries.get(key).map(Option::as_ref)
    }

    /// Keys in ascending byte order.
    pub fn keys(&self) -> impl Iterator<Item = &[u8]> {
        self.entries.keys().map(Vec::as_slice)
    }
}

/// One open write transaction over an [`OrderedProjection`].
///
/// Nothing written here can be read until [`commit`](Self::commit) produces a
/// new projection.
#[derive(Debug)]
pub struct ProjectionTxn {
    entries: Arc<Entries>,
    writes: u64,
}

impl ProjectionTxn {
    /// Insert or overwrite `key`. The last write for a key wins.
    pub fn insert(&mut self, key: Vec<u8>, value: Option<Bytes>) {
        Arc::make_mut(&mut self.entries).insert(key, value);
        self.writes += 1;
    }

    /// Number of inserts performed, duplicates included.
    pub fn writes(&self) -> u64 {
        self.writes
    }

    pub fn commit(self) -> OrderedProjection {
        OrderedProjection {
            entries: self.entries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_write_wins() {
        let mut txn = OrderedProjection::new().begin();
        txn.insert(b"k".to_vec(), Some(Bytes::from_static(b"first")));
        txn.insert(b"k".to_vec(), Some(Bytes::from_static(b"second")));
        txn.insert(b"j".to_vec(), None);
        assert_eq!(txn.writes(), 3);

        let committed = txn.commit();
        assert_eq!(committed.len(), 2);
        assert_eq!(
            committed.get(b"k"),
            Some(Some(&Bytes::from_static(b"second")))
        );
        assert_eq!(committed.get(b"j"), Some(None));
        assert_eq!(committed.get(b"missing"), None);
    }

    #[test]
    fn base_is_untouched_by_transaction() {
        let mut seed = OrderedProjection::new().begin();
        seed.insert(b"a".to_vec(), None);
        let base = seed.commit();

        let mut txn = base.begin();
        txn.insert(b"b".to_vec(), None);
        txn.insert(b"a".to_vec(), Some(Bytes::from_static(b"v")));

        // Neither the pending writes nor the commit leak into the base.
        assert_eq!(base.len(), 1);
        assert_eq!(base.get(b"a"), Some(None));
        let next = txn.commit();
        assert_eq!(base.len(), 1);
        assert!(!base.contains_key(b"b"));
        assert_eq!(next.len(), 2);
    }

    #[test]
    fn keys_are_byte_ordered_regardless_of_insert_order() {
        let mut txn = OrderedProjection::new().begin();
        for key in ["kv/b", "kv/a/2", "", "kv/a/1"] {
            txn.insert(key.as_bytes().to_vec(), None);
        }
        let projection = txn.commit();
        let keys: Vec<&[u8]> = projection.keys().collect();
        assert_eq!(
            keys,
            vec![&b""[..], &b"kv/a/1"[..], &b"kv/a/2"[..], &b"kv/b"[..]]
        );
    }

    #[test]
    fn empty_commit() {
        let projection = OrderedProjection::new().begin().commit();
        assert!(projection.is_empty());
    }
}
