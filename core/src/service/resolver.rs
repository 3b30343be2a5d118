use std::collections::BTreeSet;

use anyhow::Result;
use tracing::debug;

use crate::model::coordinate::{sheet_for_month, RangeSpec};
use crate::model::ledger::{DateRowIndex, LedgerLayout};
use crate::repository::LedgerRepository;
use crate::time::parse_ledger_date;

/// Finds the row of each date by scanning the date column of the month sheets.
pub struct CoordinateResolver<'a, R: LedgerRepository> {
    repo: &'a R,
    layout: &'a LedgerLayout,
}

impl<'a, R: LedgerRepository> CoordinateResolver<'a, R> {
    pub fn new(repo: &'a R, layout: &'a LedgerLayout) -> Self {
        Self { repo, layout }
    }

    /// Rows are numbered from 1 at the top of the column. Only rows holding exactly one
    /// `DD.MM.YYYY` value count; headers and anything malformed are skipped.
    pub fn resolve_date_rows(&self, months: &BTreeSet<u32>) -> Result<DateRowIndex> {
        let mut dates = DateRowIndex::new();
        if months.is_empty() {
            return Ok(dates);
        }

        let ranges: Vec<RangeSpec> = months
            .iter()
            .map(|&month| RangeSpec::column(sheet_for_month(month), &self.layout.date_column))
            .collect();

        for value_range in self.repo.fetch_ranges(&ranges)? {
            let before = dates.len();
            for (row_number, value) in (1..).zip(value_range.values.iter()) {
                if let [single] = value.as_slice() {
                    if let Some(date) = parse_ledger_date(single) {
                        dates.insert(date, row_number);
                    }
                }
            }
            debug!(range = %value_range.range, dates = dates.len() - before, "resolved date rows");
        }

        Ok(dates)
    }
}
