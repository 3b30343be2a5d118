use anyhow::{anyhow, Result};
use chrono::{Duration, Local, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

static LEDGER_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<day>\d{2})\.(?P<month>\d{2})\.(?P<year>\d{4})").unwrap());

/// Parses a date cell of the ledger (`DD.MM.YYYY`). Anything after the date is ignored.
///
/// Returns `None` for headers, blanks and impossible dates such as `31.02.2015`.
pub fn parse_ledger_date(input: &str) -> Option<NaiveDate> {
    let caps = LEDGER_DATE_RE.captures(input)?;
    let day = caps["day"].parse().ok()?;
    let month = caps["month"].parse().ok()?;
    let year = caps["year"].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

pub fn format_ledger_date(date: NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}

/// Date given on the command line.
pub fn parse_entry_date(input: &str) -> Result<NaiveDate> {
    let input = input.trim();
    let today = Local::now().date_naive();

    match input.to_lowercase().as_str() {
        "today" | "tod" => return Ok(today),
        "yesterday" => return Ok(today - Duration::days(1)),
        _ => {}
    }

    if let Ok(d) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Ok(d);
    }
    if let Some(d) = parse_ledger_date(input).filter(|_| input.len() == 10) {
        return Ok(d);
    }

    Err(anyhow!("Could not parse date: {}", input))
}

/// Hours from `1.5`, `1.5h`, `90m` or `1h30`.
pub fn parse_hours(input: &str) -> Result<f64> {
    let input = input.trim().to_lowercase();
    if input.is_empty() {
        return Err(anyhow!("Empty duration string"));
    }

    let hours = if let Some((h, rest)) = input.split_once('h') {
        let h: f64 = h.parse().map_err(|_| anyhow!("Invalid duration number: {}", input))?;
        let rest = rest.strip_suffix('m').unwrap_or(rest);
        let m: f64 = if rest.is_empty() {
            0.0
        } else {
            rest.parse().map_err(|_| anyhow!("Invalid minutes: {}", input))?
        };
        h + m / 60.0
    } else if let Some(m) = input.strip_suffix('m') {
        let m: f64 = m.parse().map_err(|_| anyhow!("Invalid duration number: {}", input))?;
        m / 60.0
    } else {
        input
            .parse()
            .map_err(|_| anyhow!("Invalid duration: {}", input))?
    };

    if !hours.is_finite() || hours <= 0.0 {
        return Err(anyhow!("Duration must be positive: {}", input));
    }
    Ok(hours)
}
