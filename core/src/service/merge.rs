use std::collections::{BTreeMap, BTreeSet, HashMap};

use anyhow::{anyhow, Result};
use chrono::Datelike;
use tracing::{debug, info};

use crate::error::MergeError;
use crate::model::coordinate::{CellCoordinate, RangeSpec};
use crate::model::entry::Entry;
use crate::model::ledger::{
    CellAggregates, CellUpdate, DateRowIndex, LedgerLayout, ValueInputOption,
};
use crate::model::mapping::ActivityMapping;
use crate::repository::LedgerRepository;
use crate::service::resolver::CoordinateResolver;

const DESCRIPTION_SEPARATOR: &str = ", ";

/// Sums durations per cell and collects descriptions per date, in submission order.
///
/// Fails on the first entry whose alias is unknown or whose date has no row.
pub fn compute_cells(
    entries: &[Entry],
    date_rows: &DateRowIndex,
    mapping: &ActivityMapping,
    layout: &LedgerLayout,
) -> Result<CellAggregates> {
    let mut aggregates = CellAggregates::default();

    for entry in entries {
        let column = mapping.duration_column(&entry.alias)?;
        let row = date_rows.row_for(entry.date)?;
        aggregates.add_duration(CellCoordinate::for_date(entry.date, column, row), entry.duration);

        if !entry.description.is_empty() {
            let cell = CellCoordinate::for_date(entry.date, &layout.description_column, row);
            aggregates.add_description(cell, &entry.description);
        }
    }

    Ok(aggregates)
}

/// Current content of `cells`, in one batched read. Missing or empty cells read as `""`.
///
/// Responses are matched to the requested cells by position.
pub fn fetch_existing<R: LedgerRepository>(
    repo: &R,
    cells: &BTreeSet<CellCoordinate>,
) -> Result<HashMap<CellCoordinate, String>> {
    if cells.is_empty() {
        return Ok(HashMap::new());
    }

    let ranges: Vec<RangeSpec> = cells.iter().cloned().map(RangeSpec::Cell).collect();
    let response = repo.fetch_ranges(&ranges)?;
    if response.len() != ranges.len() {
        return Err(anyhow!(
            "Ledger returned {} ranges for {} requested cells",
            response.len(),
            ranges.len()
        ));
    }

    let existing = cells
        .iter()
        .zip(response)
        .map(|(cell, value_range)| {
            let value = value_range
                .values
                .into_iter()
                .next()
                .and_then(|row| row.into_iter().next())
                .unwrap_or_default();
            (cell.clone(), value)
        })
        .collect();
    Ok(existing)
}

/// Combines the remote values with the batch.
///
/// Durations add up. A description fragment already contained in the remote text is
/// dropped, the rest are appended after it with `", "`.
pub fn merge(
    existing: &HashMap<CellCoordinate, String>,
    aggregates: &CellAggregates,
) -> Result<BTreeMap<CellCoordinate, String>> {
    let mut merged = BTreeMap::new();

    for (cell, duration) in &aggregates.durations {
        let raw = existing.get(cell).map(String::as_str).unwrap_or("");
        let current = parse_existing_duration(cell, raw)?;
        merged.insert(cell.clone(), (current + duration).to_string());
    }

    for (cell, descriptions) in &aggregates.descriptions {
        let current = existing.get(cell).map(String::as_str).unwrap_or("");
        let fresh: Vec<&str> = descriptions
            .iter()
            .map(String::as_str)
            .filter(|d| !current.contains(d))
            .collect();

        let mut value = current.to_string();
        if !current.is_empty() {
            value.push_str(DESCRIPTION_SEPARATOR);
        }
        value.push_str(&fresh.join(DESCRIPTION_SEPARATOR));
        merged.insert(cell.clone(), value);
    }

    Ok(merged)
}

fn parse_existing_duration(cell: &CellCoordinate, raw: &str) -> Result<f64> {
    if raw.is_empty() {
        return Ok(0.0);
    }
    match raw.trim().parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(n),
        _ => Err(MergeError::UnexpectedCellValue {
            cell: cell.clone(),
            value: raw.to_string(),
        }
        .into()),
    }
}

/// One batched write, values interpreted as typed by a user.
pub fn write_cells<R: LedgerRepository>(
    repo: &R,
    cells: &BTreeMap<CellCoordinate, String>,
) -> Result<()> {
    if cells.is_empty() {
        return Ok(());
    }
    let updates: Vec<CellUpdate> = cells
        .iter()
        .map(|(cell, value)| CellUpdate {
            range: cell.clone(),
            value: value.clone(),
        })
        .collect();
    repo.write_ranges(&updates, ValueInputOption::UserEntered)
}

/// Runs a batch of entries against the ledger. Nothing is kept between calls.
pub struct MergeEngine<'a, R: LedgerRepository> {
    repo: &'a R,
    mapping: &'a ActivityMapping,
    layout: &'a LedgerLayout,
}

impl<'a, R: LedgerRepository> MergeEngine<'a, R> {
    pub fn new(repo: &'a R, mapping: &'a ActivityMapping, layout: &'a LedgerLayout) -> Self {
        Self {
            repo,
            mapping,
            layout,
        }
    }

    /// Computes the write set without writing it.
    pub fn plan(&self, entries: &[Entry]) -> Result<BTreeMap<CellCoordinate, String>> {
        if entries.is_empty() {
            return Ok(BTreeMap::new());
        }

        let months: BTreeSet<u32> = entries.iter().map(|e| e.date.month()).collect();
        let date_rows = CoordinateResolver::new(self.repo, self.layout).resolve_date_rows(&months)?;

        let aggregates = compute_cells(entries, &date_rows, self.mapping, self.layout)?;
        debug!(
            durations = aggregates.durations.len(),
            descriptions = aggregates.descriptions.len(),
            "computed cells"
        );

        let existing = fetch_existing(self.repo, &aggregates.cells())?;
        merge(&existing, &aggregates)
    }

    /// Computes the write set and writes it in one call.
    pub fn apply(&self, entries: &[Entry]) -> Result<BTreeMap<CellCoordinate, String>> {
        let cells = self.plan(entries)?;
        write_cells(self.repo, &cells)?;
        info!(entries = entries.len(), cells = cells.len(), "pushed entries");
        Ok(cells)
    }
}
