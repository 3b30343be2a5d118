use std::cell::RefCell;
use std::collections::HashMap;

use anyhow::{anyhow, Result};
use uuid::Uuid;

use crate::model::coordinate::{CellCoordinate, RangeSpec};
use crate::model::entry::PendingEntry;
use crate::model::ledger::{CellUpdate, ValueInputOption, ValueRange};
use crate::repository::traits::{LedgerRepository, PendingRepository};

/// In-memory ledger that records every call.
#[derive(Default)]
pub struct MockLedgerRepo {
    /// Date column contents per sheet, row by row.
    pub date_columns: HashMap<String, Vec<Vec<String>>>,
    pub cells: HashMap<CellCoordinate, String>,
    pub fail_writes: bool,
    pub fetches: RefCell<Vec<Vec<RangeSpec>>>,
    pub writes: RefCell<Vec<(Vec<CellUpdate>, ValueInputOption)>>,
}

impl MockLedgerRepo {
    pub fn with_dates(sheet: &str, rows: &[&[&str]]) -> Self {
        let mut repo = Self::default();
        repo.add_dates(sheet, rows);
        repo
    }

    pub fn add_dates(&mut self, sheet: &str, rows: &[&[&str]]) {
        self.date_columns.insert(
            sheet.to_string(),
            rows.iter()
                .map(|r| r.iter().map(|v| v.to_string()).collect())
                .collect(),
        );
    }

    pub fn set(&mut self, cell: &str, value: &str) {
        self.cells.insert(cell.parse().unwrap(), value.to_string());
    }

    pub fn written(&self) -> Vec<(String, String)> {
        self.writes
            .borrow()
            .iter()
            .flat_map(|(updates, _)| updates.iter())
            .map(|u| (u.range.to_string(), u.value.clone()))
            .collect()
    }
}

impl LedgerRepository for MockLedgerRepo {
    fn fetch_ranges(&self, ranges: &[RangeSpec]) -> Result<Vec<ValueRange>> {
        self.fetches.borrow_mut().push(ranges.to_vec());
        ranges
            .iter()
            .map(|range| -> Result<ValueRange> {
                let values = match range {
                    RangeSpec::Column { sheet, .. } => self
                        .date_columns
                        .get(sheet)
                        .cloned()
                        .ok_or_else(|| anyhow!("Unable to parse range: {}", range))?,
                    RangeSpec::Cell(cell) => match self.cells.get(cell) {
                        Some(v) => vec![vec![v.clone()]],
                        None => Vec::new(),
                    },
                };
                Ok(ValueRange {
                    range: range.to_string(),
                    values,
                })
            })
            .collect()
    }

    fn write_ranges(&self, updates: &[CellUpdate], option: ValueInputOption) -> Result<()> {
        if self.fail_writes {
            return Err(anyhow!("connection reset"));
        }
        self.writes.borrow_mut().push((updates.to_vec(), option));
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryPendingRepo {
    pub entries: RefCell<Vec<PendingEntry>>,
}

impl PendingRepository for MemoryPendingRepo {
    fn list(&self) -> Result<Vec<PendingEntry>> {
        Ok(self.entries.borrow().clone())
    }

    fn push(&self, entry: PendingEntry) -> Result<()> {
        self.entries.borrow_mut().push(entry);
        Ok(())
    }

    fn remove(&self, id: &Uuid) -> Result<()> {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|e| e.id != *id);
        if entries.len() == before {
            return Err(anyhow!("Pending entry with ID {} not found", id));
        }
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.entries.borrow_mut().clear();
        Ok(())
    }
}
