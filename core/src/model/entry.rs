use anyhow::{anyhow, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One locally recorded unit of tracked time.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Entry {
    pub date: NaiveDate,
    pub alias: String,
    /// Hours.
    pub duration: f64,
    #[serde(default)]
    pub description: String,
}

impl Entry {
    pub fn new(
        date: NaiveDate,
        alias: impl Into<String>,
        duration: f64,
        description: impl Into<String>,
    ) -> Result<Self> {
        if !duration.is_finite() || duration <= 0.0 {
            return Err(anyhow!("Duration must be a positive number of hours, got {}", duration));
        }
        Ok(Self {
            date,
            alias: alias.into(),
            duration,
            description: description.into(),
        })
    }
}

/// An entry sitting in the local batch until the next push.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PendingEntry {
    pub id: Uuid,
    pub entry: Entry,
    pub queued_at: DateTime<Utc>,
}

impl PendingEntry {
    pub fn new(entry: Entry) -> Self {
        Self {
            id: Uuid::new_v4(),
            entry,
            queued_at: Utc::now(),
        }
    }
}
