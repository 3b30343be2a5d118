use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::model::coordinate::{letters_to_column, sheet_for_month, CellCoordinate, RangeSpec};
use crate::model::ledger::{CellUpdate, LedgerLayout, ValueInputOption, ValueRange};
use crate::repository::traits::LedgerRepository;
use crate::time::format_ledger_date;

/// Month sheets as rows of cells.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    pub sheets: BTreeMap<String, Vec<Vec<String>>>,
}

impl Workbook {
    fn sheet(&self, name: &str) -> Result<&Vec<Vec<String>>> {
        self.sheets
            .get(name)
            .ok_or_else(|| anyhow!("Sheet '{}' not found in ledger", name))
    }

    fn cell(&self, cell: &CellCoordinate) -> Result<String> {
        let rows = self.sheet(&cell.sheet)?;
        let col = column_index(&cell.column)?;
        Ok(rows
            .get(row_index(cell.row)?)
            .and_then(|r| r.get(col))
            .cloned()
            .unwrap_or_default())
    }

    fn set_cell(&mut self, cell: &CellCoordinate, value: String) -> Result<()> {
        let col = column_index(&cell.column)?;
        let rows = self
            .sheets
            .get_mut(&cell.sheet)
            .ok_or_else(|| anyhow!("Sheet '{}' not found in ledger", cell.sheet))?;
        let row = row_index(cell.row)?;
        if rows.len() <= row {
            rows.resize(row + 1, Vec::new());
        }
        let cells = &mut rows[row];
        if cells.len() <= col {
            cells.resize(col + 1, String::new());
        }
        cells[col] = value;
        Ok(())
    }
}

fn column_index(letters: &str) -> Result<usize> {
    letters_to_column(letters)
        .map(|c| c as usize - 1)
        .ok_or_else(|| anyhow!("Invalid column '{}'", letters))
}

fn row_index(row: u32) -> Result<usize> {
    (row as usize)
        .checked_sub(1)
        .ok_or_else(|| anyhow!("Rows start at 1"))
}

/// Numeric text is stored the way a spreadsheet would display it back.
fn user_entered(value: &str) -> String {
    match value.trim().parse::<f64>() {
        Ok(n) if n.is_finite() => n.to_string(),
        _ => value.to_string(),
    }
}

/// Ledger kept in a local JSON workbook.
#[derive(Clone)]
pub struct FileLedgerRepository {
    file_path: PathBuf,
}

impl FileLedgerRepository {
    /// The file is only read on first access.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: path.into(),
        }
    }

    /// Creates a ledger for `year`: one sheet per month, a header row, then one row per day.
    pub fn scaffold(path: impl Into<PathBuf>, year: i32, layout: &LedgerLayout) -> Result<Self> {
        let file_path = path.into();
        if file_path.exists() {
            return Err(anyhow!("Ledger {} already exists", file_path.display()));
        }
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut workbook = Workbook::default();
        for month in 1..=12 {
            let sheet = sheet_for_month(month);
            workbook.sheets.insert(sheet.clone(), Vec::new());
            workbook.set_cell(
                &CellCoordinate::new(&sheet, &layout.date_column, 1),
                "Date".to_string(),
            )?;
            workbook.set_cell(
                &CellCoordinate::new(&sheet, &layout.description_column, 1),
                "Description".to_string(),
            )?;

            let mut day = NaiveDate::from_ymd_opt(year, month, 1)
                .ok_or_else(|| anyhow!("Invalid year {}", year))?;
            let mut row = 2;
            while day.month() == month {
                workbook.set_cell(
                    &CellCoordinate::new(&sheet, &layout.date_column, row),
                    format_ledger_date(day),
                )?;
                row += 1;
                day = match day.succ_opt() {
                    Some(next) => next,
                    None => break,
                };
            }
        }

        let repo = Self { file_path };
        repo.write_workbook(&workbook)?;
        info!(path = %repo.file_path.display(), year, "ledger created");
        Ok(repo)
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    pub fn read_cell(&self, cell: &CellCoordinate) -> Result<String> {
        self.read_workbook()?.cell(cell)
    }

    fn read_workbook(&self) -> Result<Workbook> {
        let file = File::open(&self.file_path).with_context(|| {
            format!(
                "Could not open ledger {}, create one with `init-ledger`",
                self.file_path.display()
            )
        })?;
        let reader = BufReader::new(file);
        let workbook = serde_json::from_reader(reader)?;
        Ok(workbook)
    }

    /// Writes next to the ledger, then renames over it.
    fn write_workbook(&self, workbook: &Workbook) -> Result<()> {
        let dir = match self.file_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut temp = NamedTempFile::new_in(dir)?;
        {
            let mut writer = BufWriter::new(temp.as_file_mut());
            serde_json::to_writer_pretty(&mut writer, workbook)?;
            writer.flush()?;
        }
        temp.as_file().sync_all()?;
        temp.persist(&self.file_path)
            .with_context(|| format!("Could not replace ledger {}", self.file_path.display()))?;
        Ok(())
    }
}

impl LedgerRepository for FileLedgerRepository {
    fn fetch_ranges(&self, ranges: &[RangeSpec]) -> Result<Vec<ValueRange>> {
        let workbook = self.read_workbook()?;
        let mut result = Vec::with_capacity(ranges.len());

        for range in ranges {
            let values = match range {
                RangeSpec::Cell(cell) => {
                    let value = workbook.cell(cell)?;
                    if value.is_empty() {
                        Vec::new()
                    } else {
                        vec![vec![value]]
                    }
                }
                RangeSpec::Column { sheet, column } => {
                    let col = column_index(column)?;
                    let mut values: Vec<Vec<String>> = workbook
                        .sheet(sheet)?
                        .iter()
                        .map(|row| match row.get(col) {
                            Some(v) if !v.is_empty() => vec![v.clone()],
                            _ => Vec::new(),
                        })
                        .collect();
                    while values.last().is_some_and(|v| v.is_empty()) {
                        values.pop();
                    }
                    values
                }
            };
            result.push(ValueRange {
                range: range.to_string(),
                values,
            });
        }

        debug!(ranges = ranges.len(), "fetched ranges from ledger file");
        Ok(result)
    }

    fn write_ranges(&self, updates: &[CellUpdate], option: ValueInputOption) -> Result<()> {
        let mut workbook = self.read_workbook()?;
        for update in updates {
            let value = match option {
                ValueInputOption::UserEntered => user_entered(&update.value),
                ValueInputOption::Raw => update.value.clone(),
            };
            workbook.set_cell(&update.range, value)?;
        }
        self.write_workbook(&workbook)?;
        info!(cells = updates.len(), option = option.as_str(), "wrote cells to ledger file");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scaffolded(dir: &tempfile::TempDir) -> FileLedgerRepository {
        let path = dir.path().join("ledger.json");
        FileLedgerRepository::scaffold(path, 2015, &LedgerLayout::default()).unwrap()
    }

    #[test]
    fn test_scaffold_lays_out_dates() {
        let dir = tempfile::tempdir().unwrap();
        let repo = scaffolded(&dir);

        assert_eq!(repo.read_cell(&CellCoordinate::new("1", "B", 1)).unwrap(), "Date");
        assert_eq!(repo.read_cell(&CellCoordinate::new("1", "B", 2)).unwrap(), "01.01.2015");
        assert_eq!(repo.read_cell(&CellCoordinate::new("2", "B", 29)).unwrap(), "28.02.2015");
        assert_eq!(repo.read_cell(&CellCoordinate::new("2", "B", 30)).unwrap(), "");
        assert_eq!(repo.read_cell(&CellCoordinate::new("1", "BE", 1)).unwrap(), "Description");
        let again = FileLedgerRepository::scaffold(repo.path(), 2015, &LedgerLayout::default());
        assert!(again.is_err());
    }

    #[test]
    fn test_fetch_column_and_cells() {
        let dir = tempfile::tempdir().unwrap();
        let repo = scaffolded(&dir);

        let fetched = repo
            .fetch_ranges(&[
                RangeSpec::column("2", "B"),
                RangeSpec::Cell(CellCoordinate::new("2", "B", 2)),
                RangeSpec::Cell(CellCoordinate::new("2", "E", 2)),
            ])
            .unwrap();

        assert_eq!(fetched[0].range, "'2'!B:B");
        assert_eq!(fetched[0].values.len(), 29);
        assert_eq!(fetched[0].values[1], vec!["01.02.2015".to_string()]);
        assert_eq!(fetched[1].values, vec![vec!["01.02.2015".to_string()]]);
        assert_eq!(fetched[2].range, "'2'!E2");
        assert!(fetched[2].values.is_empty());
    }

    #[test]
    fn test_missing_file_fails_on_access() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileLedgerRepository::new(dir.path().join("nope.json"));
        let err = repo.fetch_ranges(&[RangeSpec::column("1", "B")]).unwrap_err();
        assert!(err.to_string().contains("init-ledger"));
    }

    #[test]
    fn test_fetch_unknown_sheet_fails() {
        let dir = tempfile::tempdir().unwrap();
        let repo = scaffolded(&dir);
        assert!(repo.fetch_ranges(&[RangeSpec::column("13", "B")]).is_err());
    }

    #[test]
    fn test_write_is_all_or_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let repo = scaffolded(&dir);
        let updates = vec![
            CellUpdate {
                range: CellCoordinate::new("1", "E", 2),
                value: "1".to_string(),
            },
            CellUpdate {
                range: CellCoordinate::new("13", "E", 2),
                value: "1".to_string(),
            },
        ];

        assert!(repo.write_ranges(&updates, ValueInputOption::UserEntered).is_err());
        assert_eq!(repo.read_cell(&CellCoordinate::new("1", "E", 2)).unwrap(), "");
    }

    #[test]
    fn test_write_replaces_the_file_without_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let repo = scaffolded(&dir);
        let update = CellUpdate {
            range: CellCoordinate::new("1", "E", 2),
            value: "2".to_string(),
        };

        repo.write_ranges(&[update], ValueInputOption::UserEntered).unwrap();

        let files: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(files, vec![std::ffi::OsString::from("ledger.json")]);
        assert_eq!(repo.read_cell(&CellCoordinate::new("1", "E", 2)).unwrap(), "2");
    }

    #[test]
    fn test_user_entered_normalises_numbers() {
        let dir = tempfile::tempdir().unwrap();
        let repo = scaffolded(&dir);
        let cell = CellCoordinate::new("1", "E", 2);
        let write = |value: &str, option| {
            repo.write_ranges(
                &[CellUpdate {
                    range: cell.clone(),
                    value: value.to_string(),
                }],
                option,
            )
            .unwrap();
            repo.read_cell(&cell).unwrap()
        };

        assert_eq!(write("3.50", ValueInputOption::UserEntered), "3.5");
        assert_eq!(write("hello", ValueInputOption::UserEntered), "hello");
        assert_eq!(write("3.50", ValueInputOption::Raw), "3.50");
    }
}
