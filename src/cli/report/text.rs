use std::collections::BTreeMap;

use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::fmt::{hours, percent};
use crate::reports::{
    BoardWorkTypeGroup, Dimension, HeatmapDay, MemberHours, OvertimeIncidence, ParetoItem, Summary,
    UtilisationPoint,
};

/// Target billable share; members below it are highlighted.
const UTILISATION_TARGET_PCT: f64 = 75.0;

fn utilisation_cell(pct: f64) -> Cell {
    if pct >= UTILISATION_TARGET_PCT {
        Cell::new(percent(pct).green())
    } else {
        Cell::new(percent(pct).red())
    }
}

pub fn format_summary(s: &Summary) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Metric", "Value"]);

    let range = match (s.first_date, s.last_date) {
        (Some(a), Some(b)) => format!("{a} to {b}"),
        _ => "-".to_string(),
    };
    table.add_row(vec![Cell::new("Period"), Cell::new(range)]);
    table.add_row(vec![Cell::new("Rows"), Cell::new(s.rows)]);
    table.add_row(vec![Cell::new("Members"), Cell::new(s.members)]);
    table.add_row(vec![Cell::new("Total hours".bold()), Cell::new(hours(s.total_hours))]);
    table.add_row(vec![
        Cell::new("Billable hours"),
        Cell::new(format!("{} ({})", hours(s.billable_hours), percent(s.billable_pct))),
    ]);
    table.add_row(vec![
        Cell::new("Internal hours"),
        Cell::new(format!("{} ({})", hours(s.internal_hours), percent(s.internal_pct))),
    ]);
    table.add_row(vec![Cell::new("Weekend hours"), Cell::new(hours(s.weekend_hours))]);
    let ot = if s.overtime_hours > 0.0 {
        hours(s.overtime_hours).red().to_string()
    } else {
        hours(s.overtime_hours)
    };
    table.add_row(vec![Cell::new("Overtime hours"), Cell::new(ot)]);

    format!("Summary\n{table}")
}

pub fn format_members(items: &[MemberHours]) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Member", "Total", "Billable", "Internal", "Utilisation"]);
    for m in items {
        table.add_row(vec![
            Cell::new(&m.member),
            Cell::new(hours(m.total)),
            Cell::new(hours(m.billable)),
            Cell::new(hours(m.internal)),
            utilisation_cell(m.utilisation_pct),
        ]);
    }
    format!("Hours by Member\n{table}")
}

pub fn format_utilisation(points: &[UtilisationPoint]) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Period", "Total", "Billable", "Internal", "Utilisation"]);
    for p in points {
        table.add_row(vec![
            Cell::new(&p.period),
            Cell::new(hours(p.total)),
            Cell::new(hours(p.billable)),
            Cell::new(hours(p.internal)),
            utilisation_cell(p.utilisation_pct),
        ]);
    }
    format!("Utilisation\n{table}")
}

pub fn format_pareto(dimension: Dimension, items: &[ParetoItem]) -> String {
    let mut table = Table::new();
    table.set_header(vec![dimension.label(), "Hours", "Share", "Cumulative"]);
    for item in items {
        let cumulative = if item.cumulative_pct <= 80.0 {
            percent(item.cumulative_pct).bold().to_string()
        } else {
            percent(item.cumulative_pct)
        };
        table.add_row(vec![
            Cell::new(&item.name),
            Cell::new(hours(item.hours)),
            Cell::new(percent(item.pct)),
            Cell::new(cumulative),
        ]);
    }
    format!("Pareto by {}\n{table}", dimension.label())
}

pub fn format_work_types(groups: &[BoardWorkTypeGroup]) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Board Work Type", "Hours", "Share"]);
    for g in groups {
        table.add_row(vec![
            Cell::new(g.name.as_str().bold()),
            Cell::new(hours(g.hours)),
            Cell::new(percent(g.pct)),
        ]);
        for wt in &g.work_types {
            table.add_row(vec![
                Cell::new(format!("  {}", wt.name)),
                Cell::new(hours(wt.hours)),
                Cell::new(""),
            ]);
        }
    }
    format!("Work Types\n{table}")
}

const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// One row per ISO week, one column per weekday.
pub fn format_heatmap(days: &[HeatmapDay]) -> String {
    let mut weeks: BTreeMap<&str, [Option<f64>; 7]> = BTreeMap::new();
    for d in days {
        let slot = (d.day_of_week as usize).clamp(1, 7) - 1;
        weeks.entry(d.iso_week.as_str()).or_default()[slot] = Some(d.hours);
    }

    let mut table = Table::new();
    let mut header = vec!["Week"];
    header.extend(WEEKDAYS);
    header.push("Total");
    table.set_header(header);

    for (week, cells) in &weeks {
        let mut row = vec![Cell::new(week)];
        for h in cells {
            row.push(match h {
                Some(h) if *h > 0.0 => Cell::new(hours(*h)),
                Some(_) => Cell::new("·"),
                None => Cell::new(""),
            });
        }
        let total: f64 = cells.iter().flatten().sum();
        row.push(Cell::new(hours(total).bold()));
        table.add_row(row);
    }
    format!("Heatmap\n{table}")
}

pub fn format_incidence(items: &[OvertimeIncidence]) -> String {
    let mut table = Table::new();
    table.set_header(vec![
        "Member", "Weeks", "With OT", "Incidence", "Total OT", "Avg/Week", "Peak",
    ]);
    for i in items {
        let peak = match &i.peak_week {
            Some(w) => format!("{} ({w})", hours(i.peak_overtime)),
            None => "-".to_string(),
        };
        table.add_row(vec![
            Cell::new(&i.member),
            Cell::new(i.weeks_logged),
            Cell::new(i.weeks_with_overtime),
            Cell::new(percent(i.incidence_pct)),
            Cell::new(hours(i.total_overtime)),
            Cell::new(hours(i.avg_overtime_per_week)),
            Cell::new(peak),
        ]);
    }
    format!("Overtime Incidence\n{table}")
}
