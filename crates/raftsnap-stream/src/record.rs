use bytes::Bytes;

/// One key/value unit of a snapshot's state.
///
/// Wire-compatible with the storage layer's `StorageEntry` protobuf message.
/// The key is declared as `string` in the schema but decoded as raw bytes, so
/// a record with a non-UTF-8 key is still delivered.
#[derive(Clone, PartialEq, Eq, prost::Message)]
pub struct Record {
    #[prost(bytes = "vec", tag = "1")]
    pub key: Vec<u8>,
    #[prost(bytes = "bytes", tag = "2")]
    pub value: Bytes,
    #[prost(bool, tag = "3")]
    pub seal_wrap: bool,
}

impl Record {
    pub fn new(key: impl Into<Vec<u8>>, value: impl Into<Bytes>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            seal_wrap: false,
        }
    }

    /// Key rendered as text, replacing invalid UTF-8.
    pub fn key_lossy(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.key)
    }
}
