use std::collections::HashMap;

use anyhow::{anyhow, Result};
use chrono::Local;

use crate::model::entry::Entry;
use crate::time::{parse_entry_date, parse_hours};

pub const KNOWN_KEYS: &[&str] = &["date"];

/// `add` arguments: `<alias> <duration> [description...] [date:<when>]`.
#[derive(Debug, PartialEq)]
pub struct ParsedInput {
    pub words: Vec<String>,
    pub metadata: HashMap<String, String>,
}

/// Splits `key:value` tokens with a known key from the free words. Other tokens
/// containing `:` stay part of the description.
pub fn parse_entry_args(args: &[String]) -> ParsedInput {
    let mut words = Vec::new();
    let mut metadata = HashMap::new();

    for arg in args {
        if let Some((key, value)) = arg.split_once(':') {
            if KNOWN_KEYS.contains(&key) {
                metadata.insert(key.to_string(), value.to_string());
                continue;
            }
        }
        words.push(arg.clone());
    }

    ParsedInput { words, metadata }
}

impl ParsedInput {
    /// Date defaults to today.
    pub fn into_entry(self) -> Result<Entry> {
        let mut words = self.words.into_iter();
        let alias = words.next().ok_or_else(|| anyhow!("Alias is required"))?;
        let duration = words
            .next()
            .ok_or_else(|| anyhow!("Duration is required"))
            .and_then(|d| parse_hours(&d))?;
        let description = words.collect::<Vec<_>>().join(" ");

        let date = match self.metadata.get("date") {
            Some(d) => parse_entry_date(d)?,
            None => Local::now().date_naive(),
        };

        Entry::new(date, alias, duration, description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_parse_entry() {
        let parsed = parse_entry_args(&args(&[
            "petzi_dev_website",
            "1h30",
            "Fix",
            "login",
            "date:2015-01-02",
        ]));
        assert_eq!(parsed.metadata.get("date"), Some(&"2015-01-02".to_string()));

        let entry = parsed.into_entry().unwrap();
        assert_eq!(entry.alias, "petzi_dev_website");
        assert_eq!(entry.duration, 1.5);
        assert_eq!(entry.description, "Fix login");
        assert_eq!(entry.date, NaiveDate::from_ymd_opt(2015, 1, 2).unwrap());
    }

    #[test]
    fn test_colon_in_description_is_kept() {
        let parsed =
            parse_entry_args(&args(&["petzi_infra", "2", "note:", "reboot", "date:01.03.2015"]));
        let entry = parsed.into_entry().unwrap();
        assert_eq!(entry.description, "note: reboot");
        assert_eq!(entry.date, NaiveDate::from_ymd_opt(2015, 3, 1).unwrap());
    }

    #[test]
    fn test_missing_parts() {
        assert!(parse_entry_args(&args(&[])).into_entry().is_err());
        assert!(parse_entry_args(&args(&["petzi_infra"])).into_entry().is_err());
        assert!(parse_entry_args(&args(&["petzi_infra", "soon"])).into_entry().is_err());
        assert!(parse_entry_args(&args(&["petzi_infra", "1", "date:later"])).into_entry().is_err());
    }

    #[test]
    fn test_only_the_full_date_key_is_metadata() {
        let parsed = parse_entry_args(&args(&["petzi_infra", "1", "d:ops", "dat:review"]));
        assert!(parsed.metadata.is_empty());

        let entry = parsed.into_entry().unwrap();
        assert_eq!(entry.description, "d:ops dat:review");
    }
}
