use crate::model::coordinate::RangeSpec;
use crate::model::entry::PendingEntry;
use crate::model::ledger::{CellUpdate, ValueInputOption, ValueRange};
use anyhow::Result;
use uuid::Uuid;

/// Batched access to the remote ledger.
pub trait LedgerRepository {
    /// One `ValueRange` per requested range. A range without data comes back with no values.
    fn fetch_ranges(&self, ranges: &[RangeSpec]) -> Result<Vec<ValueRange>>;
    /// Applies every update or none of them.
    fn write_ranges(&self, updates: &[CellUpdate], option: ValueInputOption) -> Result<()>;
}

/// Local batch of entries waiting to be pushed.
pub trait PendingRepository {
    fn list(&self) -> Result<Vec<PendingEntry>>;
    fn push(&self, entry: PendingEntry) -> Result<()>;
    fn remove(&self, id: &Uuid) -> Result<()>;
    fn clear(&self) -> Result<()>;
}
