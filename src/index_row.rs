/// Secondary-index entry for stores that maintain indexes as plain rows.
///
/// The entry records when it was written, the raw primary key bytes it points
/// at and, for entries superseded by a newer write, a stale copy of the
/// primary data as it looked when the entry was current. Serialization is the
/// collaborating store's business, through [`IndexRowCodec`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRow {
    /// Timestamp of the write that produced this entry, in the store's clock
    /// units.
    pub write_timestamp: i64,
    /// Raw primary key bytes, absent when the owning transaction never got
    /// that far.
    pub primary_key: Option<Box<[u8]>>,
    /// Copy of the primary data at write time, present only on superseded
    /// entries.
    pub stale_data: Option<Box<[u8]>>,
}

impl IndexRow {
    pub fn new(write_timestamp: i64, primary_key: Option<Box<[u8]>>) -> Self {
        Self {
            write_timestamp,
            primary_key,
            stale_data: None,
        }
    }

    pub fn with_stale_data(mut self, stale_data: Box<[u8]>) -> Self {
        self.stale_data = Some(stale_data);
        self
    }

    /// Whether this entry is eligible for background pruning.
    ///
    /// Entries younger than `max_transaction` are never fossils, since the
    /// transaction that wrote them may still complete. Older entries are
    /// fossils when they carry no primary key (a partially failed write),
    /// when the primary row they point at is gone (`current_data` is `None`),
    /// or when their stale copy no longer matches the current primary data.
    pub fn is_fossil(
        &self,
        now: i64,
        max_transaction: i64,
        current_data: Option<&[u8]>,
    ) -> bool {
        if now - self.write_timestamp <= max_transaction {
            return false;
        }
        if self.primary_key.is_none() {
            return true;
        }
        let Some(current) = current_data else {
            return true;
        };
        match &self.stale_data {
            Some(stale) => **stale != *current,
            None => false,
        }
    }
}

/// Serialization seam for index rows; the binary layout belongs to the
/// collaborating store.
pub trait IndexRowCodec {
    type Error;

    fn encode(&self, row: &IndexRow) -> Result<Box<[u8]>, Self::Error>;
    fn decode(&self, bytes: &[u8]) -> Result<IndexRow, Self::Error>;
}
