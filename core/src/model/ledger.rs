use std::collections::{BTreeMap, BTreeSet, HashMap};

use anyhow::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::MergeError;
use crate::model::coordinate::{normalize_column, CellCoordinate};

pub const DEFAULT_DATE_COLUMN: &str = "B";
pub const DEFAULT_DESCRIPTION_COLUMN: &str = "BE";

/// Fixed columns shared by every month sheet.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LedgerLayout {
    #[serde(deserialize_with = "column_letters")]
    pub date_column: String,
    #[serde(deserialize_with = "column_letters")]
    pub description_column: String,
}

impl LedgerLayout {
    pub fn new(date_column: &str, description_column: &str) -> Result<Self> {
        Ok(Self {
            date_column: normalize_column(date_column)?,
            description_column: normalize_column(description_column)?,
        })
    }
}

fn column_letters<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let letters = String::deserialize(deserializer)?;
    normalize_column(&letters).map_err(serde::de::Error::custom)
}

impl Default for LedgerLayout {
    fn default() -> Self {
        Self {
            date_column: DEFAULT_DATE_COLUMN.to_string(),
            description_column: DEFAULT_DESCRIPTION_COLUMN.to_string(),
        }
    }
}

/// Date to row number, rebuilt for every push from the date column of each month sheet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DateRowIndex {
    rows: HashMap<NaiveDate, u32>,
}

impl DateRowIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, date: NaiveDate, row: u32) {
        self.rows.insert(date, row);
    }

    pub fn get(&self, date: NaiveDate) -> Option<u32> {
        self.rows.get(&date).copied()
    }

    pub fn row_for(&self, date: NaiveDate) -> Result<u32> {
        self.get(date).ok_or_else(|| MergeError::DateNotFound(date).into())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl FromIterator<(NaiveDate, u32)> for DateRowIndex {
    fn from_iter<I: IntoIterator<Item = (NaiveDate, u32)>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

/// New values computed locally for one batch, before they meet the remote ones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellAggregates {
    pub durations: BTreeMap<CellCoordinate, f64>,
    /// Fragments in submission order, not deduplicated.
    pub descriptions: BTreeMap<CellCoordinate, Vec<String>>,
}

impl CellAggregates {
    pub fn add_duration(&mut self, cell: CellCoordinate, hours: f64) {
        *self.durations.entry(cell).or_insert(0.0) += hours;
    }

    pub fn add_description(&mut self, cell: CellCoordinate, description: &str) {
        self.descriptions
            .entry(cell)
            .or_default()
            .push(description.to_string());
    }

    /// Every cell touched by the batch, once.
    pub fn cells(&self) -> BTreeSet<CellCoordinate> {
        self.durations
            .keys()
            .chain(self.descriptions.keys())
            .cloned()
            .collect()
    }
}

/// One fetched range as returned by the transport.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ValueRange {
    pub range: String,
    #[serde(default)]
    pub values: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CellUpdate {
    pub range: CellCoordinate,
    pub value: String,
}

/// How the ledger interprets written text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueInputOption {
    /// As if typed by a user: numeric text becomes a number.
    UserEntered,
    Raw,
}

impl ValueInputOption {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueInputOption::UserEntered => "USER_ENTERED",
            ValueInputOption::Raw => "RAW",
        }
    }
}
