use std::path::Path;

use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::{export, load_import, FilterArgs, OutputFormat};
use crate::error::{Result, TimesheetError};
use crate::fmt::hours;
use crate::models::MemberWeekOvertime;
use crate::overtime::OvertimeRules;
use crate::reports::filtered_weekly_overtime;
use crate::settings::Settings;

pub fn run(
    file: &Path,
    settings: &Settings,
    format: OutputFormat,
    week: Option<&str>,
    only_overtime: bool,
    output: Option<&Path>,
    filter: &FilterArgs,
) -> Result<()> {
    if let Some(w) = week {
        validate_week(w)?;
    }
    let (rows, filter) = load_import(file, settings, filter)?;
    let rules = OvertimeRules::from_settings(settings);
    let weeks = select_weeks(
        filtered_weekly_overtime(&rows, &filter, &rules),
        week,
        only_overtime,
    );

    match format {
        OutputFormat::Table => export::write_text(&format_overtime(&weeks), output),
        OutputFormat::Csv => {
            let flat: Vec<OvertimeCsvRow> = weeks.iter().map(OvertimeCsvRow::from).collect();
            export::write_csv(&flat, output)
        }
        OutputFormat::Json => export::write_json(&weeks, output),
    }
}

fn validate_week(week: &str) -> Result<()> {
    let valid = week.len() == 8
        && week.as_bytes()[4] == b'-'
        && week.as_bytes()[5] == b'W'
        && week[..4].chars().all(|c| c.is_ascii_digit())
        && week[6..].parse::<u32>().is_ok_and(|n| (1..=53).contains(&n));
    if valid {
        Ok(())
    } else {
        Err(TimesheetError::InvalidFilter(format!("week must look like 2024-W10: {week}")))
    }
}

pub fn select_weeks(
    weeks: Vec<MemberWeekOvertime>,
    week: Option<&str>,
    only_overtime: bool,
) -> Vec<MemberWeekOvertime> {
    weeks
        .into_iter()
        .filter(|w| week.map_or(true, |wk| w.iso_week == wk))
        .filter(|w| !only_overtime || w.overtime.total > 0.0)
        .collect()
}

/// Flat CSV shape: one column per overtime component.
#[derive(serde::Serialize)]
struct OvertimeCsvRow<'a> {
    member: &'a str,
    iso_week: &'a str,
    daily_weekday: f64,
    weekly_overflow: f64,
    weekend_holiday: f64,
    total: f64,
}

impl<'a> From<&'a MemberWeekOvertime> for OvertimeCsvRow<'a> {
    fn from(w: &'a MemberWeekOvertime) -> Self {
        Self {
            member: &w.member,
            iso_week: &w.iso_week,
            daily_weekday: w.overtime.daily_weekday,
            weekly_overflow: w.overtime.weekly_overflow,
            weekend_holiday: w.overtime.weekend_holiday,
            total: w.overtime.total,
        }
    }
}

pub fn format_overtime(weeks: &[MemberWeekOvertime]) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Member", "Week", "Daily", "Overflow", "Weekend/BH", "Total"]);

    let mut grand_total = 0.0;
    for w in weeks {
        let ot = &w.overtime;
        grand_total += ot.total;
        let total = if ot.total > 0.0 {
            hours(ot.total).red().to_string()
        } else {
            hours(ot.total)
        };
        table.add_row(vec![
            Cell::new(&w.member),
            Cell::new(&w.iso_week),
            Cell::new(hours(ot.daily_weekday)),
            Cell::new(hours(ot.weekly_overflow)),
            Cell::new(hours(ot.weekend_holiday)),
            Cell::new(total),
        ]);
    }
    table.add_row(vec![
        Cell::new("Total".bold()),
        Cell::new(""),
        Cell::new(""),
        Cell::new(""),
        Cell::new(""),
        Cell::new(hours(grand_total).bold()),
    ]);

    format!("Weekly Overtime\n{table}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OvertimeBreakdown;

    fn week(member: &str, iso_week: &str, total: f64) -> MemberWeekOvertime {
        MemberWeekOvertime {
            member: member.to_string(),
            iso_week: iso_week.to_string(),
            overtime: OvertimeBreakdown {
                daily_weekday: total,
                total,
                ..OvertimeBreakdown::default()
            },
        }
    }

    #[test]
    fn test_validate_week() {
        assert!(validate_week("2024-W10").is_ok());
        assert!(validate_week("2024-W01").is_ok());
        assert!(validate_week("2024-W54").is_err());
        assert!(validate_week("2024-10").is_err());
        assert!(validate_week("24-W10").is_err());
    }

    #[test]
    fn test_select_weeks() {
        let weeks = vec![
            week("Jo Smith", "2024-W10", 2.5),
            week("Jo Smith", "2024-W11", 0.0),
            week("Mark Bolton", "2024-W10", 0.0),
        ];
        assert_eq!(select_weeks(weeks.clone(), Some("2024-W10"), false).len(), 2);
        let only = select_weeks(weeks.clone(), None, true);
        assert_eq!(only.len(), 1);
        assert_eq!(only[0].iso_week, "2024-W10");
        assert_eq!(select_weeks(weeks, None, false).len(), 3);
    }

    #[test]
    fn test_format_overtime() {
        colored::control::set_override(false);
        let out = format_overtime(&[week("Jo Smith", "2024-W10", 2.5)]);
        assert!(out.starts_with("Weekly Overtime"));
        assert!(out.contains("Jo Smith"));
        assert!(out.contains("2024-W10"));
        assert!(out.contains("2.50"));
    }
}
