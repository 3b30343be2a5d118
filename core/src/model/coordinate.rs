use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use chrono::{Datelike, NaiveDate};

/// Address of one value slot in the ledger. Sheets are named after the month number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellCoordinate {
    pub sheet: String,
    pub column: String,
    pub row: u32,
}

impl CellCoordinate {
    /// Column letters are stored upper-case so that `be` and `BE` address the same cell.
    pub fn new(sheet: impl Into<String>, column: impl AsRef<str>, row: u32) -> Self {
        Self {
            sheet: sheet.into(),
            column: column.as_ref().to_ascii_uppercase(),
            row,
        }
    }

    /// Cell in the sheet of `date`'s month.
    pub fn for_date(date: NaiveDate, column: &str, row: u32) -> Self {
        Self::new(sheet_for_month(date.month()), column, row)
    }
}

pub fn sheet_for_month(month: u32) -> String {
    month.to_string()
}

fn write_sheet_name(f: &mut fmt::Formatter<'_>, sheet: &str) -> fmt::Result {
    write!(f, "'{}'", sheet.replace('\'', "''"))
}

impl fmt::Display for CellCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_sheet_name(f, &self.sheet)?;
        write!(f, "!{}{}", self.column, self.row)
    }
}

impl FromStr for CellCoordinate {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (sheet, cell) = s
            .rsplit_once('!')
            .ok_or_else(|| anyhow!("Missing sheet name in cell address: '{}'", s))?;

        let sheet = match sheet.strip_prefix('\'').and_then(|x| x.strip_suffix('\'')) {
            Some(quoted) => quoted.replace("''", "'"),
            None => sheet.to_string(),
        };
        if sheet.is_empty() {
            return Err(anyhow!("Empty sheet name in cell address: '{}'", s));
        }

        let split = cell
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(cell.len());
        let (column, row) = cell.split_at(split);
        let column = column.to_ascii_uppercase();
        if letters_to_column(&column).is_none() {
            return Err(anyhow!("Invalid column in cell address: '{}'", s));
        }
        let row: u32 = row
            .parse()
            .map_err(|_| anyhow!("Invalid row in cell address: '{}'", s))?;
        if row == 0 {
            return Err(anyhow!("Rows start at 1 in cell address: '{}'", s));
        }

        Ok(Self { sheet, column, row })
    }
}

/// A range handed to the transport: one cell, or a whole column of a sheet.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RangeSpec {
    Cell(CellCoordinate),
    Column { sheet: String, column: String },
}

impl RangeSpec {
    pub fn column(sheet: impl Into<String>, column: impl AsRef<str>) -> Self {
        RangeSpec::Column {
            sheet: sheet.into(),
            column: column.as_ref().to_ascii_uppercase(),
        }
    }
}

impl fmt::Display for RangeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeSpec::Cell(cell) => write!(f, "{}", cell),
            RangeSpec::Column { sheet, column } => {
                write_sheet_name(f, sheet)?;
                write!(f, "!{}:{}", column, column)
            }
        }
    }
}

/// A -> 1, Z -> 26, AA -> 27. `None` for empty or non-letter input.
pub fn letters_to_column(letters: &str) -> Option<u32> {
    if letters.is_empty() {
        return None;
    }
    let mut col: u32 = 0;
    for ch in letters.chars() {
        let ch = ch.to_ascii_uppercase();
        if !ch.is_ascii_uppercase() {
            return None;
        }
        col = col.checked_mul(26)?.checked_add((ch as u8 - b'A' + 1) as u32)?;
    }
    Some(col)
}

/// Validated, upper-cased column letters.
pub fn normalize_column(letters: &str) -> Result<String> {
    match letters_to_column(letters) {
        Some(_) => Ok(letters.to_ascii_uppercase()),
        None => Err(anyhow!("Invalid column '{}'", letters)),
    }
}
