use raftsnap_stream::Record;
use tracing::debug;

use crate::projection::{OrderedProjection, ProjectionTxn};

/// Per-record callback run alongside the projection.
pub trait RecordSink {
    fn observe(&mut self, record: &Record);
}

impl RecordSink for () {
    fn observe(&mut self, _record: &Record) {}
}

impl<S: RecordSink + ?Sized> RecordSink for &mut S {
    fn observe(&mut self, record: &Record) {
        (**self).observe(record);
    }
}

impl<S: RecordSink + ?Sized> RecordSink for Box<S> {
    fn observe(&mut self, record: &Record) {
        (**self).observe(record);
    }
}

/// Result of a completed projection pass.
#[derive(Debug)]
pub struct BuildOutput<S> {
    pub projection: OrderedProjection,
    pub sink: S,
    /// Records applied, including duplicates and empty keys.
    pub records: u64,
}

/// Feeds each record into one open transaction and into a sink.
///
/// The transaction is committed once, by [`finish`](Self::finish).
#[derive(Debug)]
pub struct ProjectionBuilder<S> {
    txn: ProjectionTxn,
    sink: S,
    load_values: bool,
    records: u64,
}

impl<S: RecordSink> ProjectionBuilder<S> {
    pub fn new(sink: S) -> Self {
        Self::on(&OrderedProjection::new(), sink)
    }

    /// Build on top of an existing projection.
    pub fn on(base: &OrderedProjection, sink: S) -> Self {
        Self {
            txn: base.begin(),
            sink,
            load_values: false,
            records: 0,
        }
    }

    /// Keep record values instead of a placeholder.
    pub fn load_values(mut self, load: bool) -> Self {
        self.load_values = load;
        self
    }

    pub fn apply(&mut self, record: Record) {
        self.sink.observe(&record);
        let value = self.load_values.then_some(record.value);
        self.txn.insert(record.key, value);
        self.records += 1;
    }

    pub fn finish(self) -> BuildOutput<S> {
        let projection = self.txn.commit();
        debug!(
            records = self.records,
            unique_keys = projection.len(),
            "projection committed"
        );
        BuildOutput {
            projection,
            sink: self.sink,
            records: self.records,
        }
    }
}
