use std::path::Path;

use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::error::Result;
use crate::fmt::hours;
use crate::importer::{parse_csv_file, Import};
use crate::settings::Settings;

pub fn run(file: &Path, settings: &Settings) -> Result<()> {
    let import = parse_csv_file(file, settings)?;
    println!("{}", format_check(&file.display().to_string(), &import));
    Ok(())
}

pub fn format_check(name: &str, import: &Import) -> String {
    let report = &import.report;
    let mut table = Table::new();
    table.set_header(vec!["", "Rows"]);
    table.add_row(vec![Cell::new("Read"), Cell::new(report.rows_read)]);
    table.add_row(vec![
        Cell::new("Kept".green().to_string()),
        Cell::new(report.rows_kept),
    ]);
    table.add_row(vec![Cell::new("Skipped: hours <= 0"), Cell::new(report.skipped_hours)]);
    table.add_row(vec![Cell::new("Skipped: excluded role"), Cell::new(report.skipped_role)]);
    table.add_row(vec![Cell::new("Skipped: unreadable date"), Cell::new(report.skipped_date)]);

    let total: f64 = import.rows.iter().map(|r| r.hours).sum();
    let first = import.rows.iter().map(|r| r.date).min();
    let last = import.rows.iter().map(|r| r.date).max();
    let range = match (first, last) {
        (Some(a), Some(b)) => format!("{a} to {b}"),
        _ => "no dates".to_string(),
    };

    format!(
        "{}\n{table}\nHours: {}  ({range})",
        format!("Check: {name}").bold(),
        hours(total)
    )
}
