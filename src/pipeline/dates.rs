//! Date parsing and age arithmetic for French-locale leads.
//!
//! Canonical output format is `DD/MM/YYYY` everywhere.

use chrono::{Datelike, NaiveDate};

/// Canonical lead date format.
pub const LEAD_DATE_FORMAT: &str = "%d/%m/%Y";

const NUMERIC_FORMATS: &[&str] = &["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%Y-%m-%d", "%Y/%m/%d"];

/// Parse a date as partners write it.
/// Supports: European DD/MM/YYYY (slash, dash, dot), ISO 8601, French textual dates.
pub fn parse_lead_date(date_str: &str) -> Option<NaiveDate> {
    let trimmed = date_str.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(d) = parse_numeric(trimmed) {
        return Some(d);
    }

    // "15/03/1980 00:00:00" or "1980-03-15T00:00:00"
    let head = trimmed
        .split(|c: char| c.is_whitespace() || c == 'T')
        .next()
        .unwrap_or(trimmed);
    if head != trimmed {
        if let Some(d) = parse_numeric(head) {
            return Some(d);
        }
    }

    parse_french_textual_date(trimmed)
}

fn parse_numeric(text: &str) -> Option<NaiveDate> {
    NUMERIC_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
}

/// Parse French textual date like "15 janvier 2024" or "1er mars 2024".
fn parse_french_textual_date(text: &str) -> Option<NaiveDate> {
    let lower = text.to_lowercase();
    let parts: Vec<&str> = lower.split_whitespace().collect();
    if parts.len() < 3 {
        return None;
    }

    // Optional weekday prefix: "lundi 15 janvier 2024"
    let parts = if parts[0].parse::<u32>().is_err() && !parts[0].ends_with("er") {
        &parts[1..]
    } else {
        &parts[..]
    };
    if parts.len() < 3 {
        return None;
    }

    let day_str = parts[0].trim_end_matches("er").trim_end_matches("ème");
    let day: u32 = day_str.parse().ok()?;

    let month = match parts[1] {
        "janvier" => 1,
        "février" | "fevrier" => 2,
        "mars" => 3,
        "avril" => 4,
        "mai" => 5,
        "juin" => 6,
        "juillet" => 7,
        "août" | "aout" => 8,
        "septembre" => 9,
        "octobre" => 10,
        "novembre" => 11,
        "décembre" | "decembre" => 12,
        _ => return None,
    };

    let year: i32 = parts[2].parse().ok()?;

    NaiveDate::from_ymd_opt(year, month, day)
}

/// Reformat any accepted date to `DD/MM/YYYY`; `None` when unparseable.
pub fn normalize_lead_date(date_str: &str) -> Option<String> {
    parse_lead_date(date_str).map(|d| d.format(LEAD_DATE_FORMAT).to_string())
}

pub fn format_lead_date(date: NaiveDate) -> String {
    date.format(LEAD_DATE_FORMAT).to_string()
}

/// Age in completed years on `today`. Negative when born after `today`.
pub fn age_on(birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    age
}

/// First day of the month following `today`.
pub fn first_of_next_month(today: NaiveDate) -> NaiveDate {
    let (year, month) = if today.month() == 12 {
        (today.year() + 1, 1)
    } else {
        (today.year(), today.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(today)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn parse_european_variants() {
        assert_eq!(parse_lead_date("15/03/1980"), Some(d(1980, 3, 15)));
        assert_eq!(parse_lead_date("15-03-1980"), Some(d(1980, 3, 15)));
        assert_eq!(parse_lead_date("15.03.1980"), Some(d(1980, 3, 15)));
    }

    #[test]
    fn parse_iso_and_timestamps() {
        assert_eq!(parse_lead_date("1980-03-15"), Some(d(1980, 3, 15)));
        assert_eq!(parse_lead_date("1980-03-15T00:00:00"), Some(d(1980, 3, 15)));
        assert_eq!(parse_lead_date("15/03/1980 00:00"), Some(d(1980, 3, 15)));
    }

    #[test]
    fn parse_french_textual() {
        assert_eq!(parse_lead_date("15 janvier 2024"), Some(d(2024, 1, 15)));
        assert_eq!(parse_lead_date("1er mars 2024"), Some(d(2024, 3, 1)));
        assert_eq!(parse_lead_date("14 février 2024"), Some(d(2024, 2, 14)));
        assert_eq!(parse_lead_date("lundi 15 janvier 2024"), Some(d(2024, 1, 15)));
    }

    #[test]
    fn parse_invalid_returns_none() {
        assert_eq!(parse_lead_date(""), None);
        assert_eq!(parse_lead_date("bientôt"), None);
        assert_eq!(parse_lead_date("31/02/2020"), None);
    }

    #[test]
    fn normalize_outputs_canonical_format() {
        assert_eq!(normalize_lead_date("1980-03-05").as_deref(), Some("05/03/1980"));
        assert_eq!(normalize_lead_date("n/a"), None);
    }

    #[test]
    fn age_counts_completed_years() {
        let today = d(2026, 6, 15);
        assert_eq!(age_on(d(2008, 6, 15), today), 18);
        assert_eq!(age_on(d(2008, 6, 16), today), 17);
        assert_eq!(age_on(d(2026, 6, 15), today), 0);
        assert_eq!(age_on(d(2026, 7, 1), today), -1);
    }

    #[test]
    fn leap_day_birthday() {
        // Born 29/02: birthday not reached until 01/03 in common years.
        assert_eq!(age_on(d(2000, 2, 29), d(2018, 2, 28)), 17);
        assert_eq!(age_on(d(2000, 2, 29), d(2018, 3, 1)), 18);
    }

    #[test]
    fn next_month_rollover() {
        assert_eq!(first_of_next_month(d(2026, 1, 31)), d(2026, 2, 1));
        assert_eq!(first_of_next_month(d(2026, 12, 10)), d(2027, 1, 1));
    }
}
