use std::sync::OnceLock;

use chrono::{Datelike, NaiveDate, Weekday};
use regex::Regex;

// ---------------------------------------------------------------------------
// Strict UK date parsing
// ---------------------------------------------------------------------------

fn four_digit_year() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4})$").unwrap())
}

fn two_digit_year() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{2})/(\d{2})/(\d{2})$").unwrap())
}

/// Parse a day-first date: `DD/MM/YYYY`, `D/M/YYYY` or `DD/MM/YY`.
///
/// There is no month-first fallback. Two-digit years land in 2000-2099.
pub fn parse_uk_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let (d, m, y) = if let Some(caps) = four_digit_year().captures(raw) {
        let y: i32 = caps[3].parse().ok()?;
        (caps[1].parse::<u32>().ok()?, caps[2].parse::<u32>().ok()?, y)
    } else if let Some(caps) = two_digit_year().captures(raw) {
        let y: i32 = caps[3].parse().ok()?;
        (caps[1].parse::<u32>().ok()?, caps[2].parse::<u32>().ok()?, 2000 + y)
    } else {
        return None;
    };
    NaiveDate::from_ymd_opt(y, m, d)
}

// ---------------------------------------------------------------------------
// Derived calendar fields
// ---------------------------------------------------------------------------

pub fn calendar_month(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

/// ISO-8601 week id, using the ISO week-year: `2024-W10`.
pub fn iso_week_id(date: NaiveDate) -> String {
    let iso = date.iso_week();
    format!("{}-W{:02}", iso.year(), iso.week())
}

/// 1 = Monday .. 7 = Sunday.
pub fn day_of_week(date: NaiveDate) -> u32 {
    date.weekday().number_from_monday()
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Fiscal year (identified by the calendar year it starts in) and fiscal
/// month (1 = first month of the fiscal year).
pub fn fiscal_period(date: NaiveDate, start_month: u32) -> (i32, u32) {
    let start = start_month.clamp(1, 12);
    let year = if date.month() >= start {
        date.year()
    } else {
        date.year() - 1
    };
    let month = (date.month() + 12 - start) % 12 + 1;
    (year, month)
}

/// `2024/25` for a fiscal year starting in 2024. Calendar-aligned years
/// (January start) are labelled with the plain year.
pub fn fiscal_year_label(fiscal_year: i32, start_month: u32) -> String {
    if start_month <= 1 {
        fiscal_year.to_string()
    } else {
        format!("{}/{:02}", fiscal_year, (fiscal_year + 1).rem_euclid(100))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_uk_date_formats() {
        assert_eq!(parse_uk_date("04/03/2024"), Some(ymd(2024, 3, 4)));
        assert_eq!(parse_uk_date("4/3/2024"), Some(ymd(2024, 3, 4)));
        assert_eq!(parse_uk_date("04/03/24"), Some(ymd(2024, 3, 4)));
        assert_eq!(parse_uk_date("  15/11/2023 "), Some(ymd(2023, 11, 15)));
    }

    #[test]
    fn test_parse_uk_date_is_day_first_only() {
        // Month 13 would be valid month-first; day-first it is rejected.
        assert_eq!(parse_uk_date("01/13/2024"), None);
        assert_eq!(parse_uk_date("13/01/2024"), Some(ymd(2024, 1, 13)));
    }

    #[test]
    fn test_parse_uk_date_rejects_invalid() {
        assert_eq!(parse_uk_date("31/02/2024"), None);
        assert_eq!(parse_uk_date("00/01/2024"), None);
        assert_eq!(parse_uk_date("2024-03-04"), None);
        assert_eq!(parse_uk_date("4/3/24"), None);
        assert_eq!(parse_uk_date(""), None);
        assert_eq!(parse_uk_date("04/03/2024 09:00"), None);
    }

    #[test]
    fn test_leap_day() {
        assert_eq!(parse_uk_date("29/02/2024"), Some(ymd(2024, 2, 29)));
        assert_eq!(parse_uk_date("29/02/2023"), None);
    }

    #[test]
    fn test_iso_week_id_uses_iso_year() {
        assert_eq!(iso_week_id(ymd(2024, 3, 4)), "2024-W10");
        // 30 Dec 2024 is in ISO week 1 of 2025.
        assert_eq!(iso_week_id(ymd(2024, 12, 30)), "2025-W01");
        // 1 Jan 2021 belongs to 2020-W53.
        assert_eq!(iso_week_id(ymd(2021, 1, 1)), "2020-W53");
    }

    #[test]
    fn test_day_of_week_and_weekend() {
        assert_eq!(day_of_week(ymd(2024, 3, 4)), 1);
        assert_eq!(day_of_week(ymd(2024, 3, 10)), 7);
        assert!(is_weekend(ymd(2024, 3, 9)));
        assert!(!is_weekend(ymd(2024, 3, 8)));
    }

    #[test]
    fn test_fiscal_period_april_start() {
        assert_eq!(fiscal_period(ymd(2024, 4, 1), 4), (2024, 1));
        assert_eq!(fiscal_period(ymd(2024, 3, 31), 4), (2023, 12));
        assert_eq!(fiscal_period(ymd(2025, 1, 15), 4), (2024, 10));
        assert_eq!(fiscal_period(ymd(2024, 7, 1), 1), (2024, 7));
    }

    #[test]
    fn test_fiscal_year_label() {
        assert_eq!(fiscal_year_label(2024, 4), "2024/25");
        assert_eq!(fiscal_year_label(1999, 4), "1999/00");
        assert_eq!(fiscal_year_label(2024, 1), "2024");
    }

    #[test]
    fn test_calendar_month() {
        assert_eq!(calendar_month(ymd(2024, 3, 4)), "2024-03");
    }
}
