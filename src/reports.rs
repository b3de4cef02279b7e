use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::Serialize;

use crate::calendar::{day_of_week, iso_week_id, parse_uk_date};
use crate::error::{Result, TimesheetError};
use crate::models::{MemberWeekOvertime, NormalizedRow};
use crate::overtime::{compute_weekly_overtime, normalize_member_name, round_quarter, OvertimeRules};

fn pct(part: f64, whole: f64) -> f64 {
    if whole != 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}

// ---------------------------------------------------------------------------
// Row filter
// ---------------------------------------------------------------------------

/// Narrows the row set before any report or overtime run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowFilter {
    pub member: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    /// `YYYY-MM`
    pub month: Option<String>,
    pub company: Option<String>,
    pub billable_only: bool,
}

fn parse_filter_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .ok()
        .or_else(|| parse_uk_date(raw))
        .ok_or_else(|| TimesheetError::InvalidFilter(format!("not a date: {raw}")))
}

impl RowFilter {
    pub fn from_args(
        member: Option<&str>,
        from_date: Option<&str>,
        to_date: Option<&str>,
        month: Option<&str>,
        company: Option<&str>,
        billable_only: bool,
    ) -> Result<Self> {
        let (from, to) = match (from_date, to_date) {
            (Some(from), Some(to)) => (Some(parse_filter_date(from)?), Some(parse_filter_date(to)?)),
            (Some(_), None) => {
                return Err(TimesheetError::InvalidFilter(
                    "--from requires --to (both date boundaries must be specified)".to_string(),
                ));
            }
            (None, Some(_)) => {
                return Err(TimesheetError::InvalidFilter(
                    "--to requires --from (both date boundaries must be specified)".to_string(),
                ));
            }
            (None, None) => (None, None),
        };
        if let (Some(f), Some(t)) = (from, to) {
            if f > t {
                return Err(TimesheetError::InvalidFilter(format!("--from {f} is after --to {t}")));
            }
        }
        if let Some(m) = month {
            if NaiveDate::parse_from_str(&format!("{m}-01"), "%Y-%m-%d").is_err() {
                return Err(TimesheetError::InvalidFilter(format!("month must be YYYY-MM: {m}")));
            }
        }
        Ok(Self {
            member: member.map(normalize_member_name),
            from,
            to,
            month: month.map(str::to_string),
            company: company.map(|c| c.trim().to_string()),
            billable_only,
        })
    }

    pub fn matches(&self, row: &NormalizedRow) -> bool {
        if let Some(member) = &self.member {
            if !normalize_member_name(&row.member).eq_ignore_ascii_case(member) {
                return false;
            }
        }
        if self.from.is_some_and(|f| row.date < f) || self.to.is_some_and(|t| row.date > t) {
            return false;
        }
        if self.month.as_deref().is_some_and(|m| row.calendar_month != m) {
            return false;
        }
        if let Some(company) = &self.company {
            if !row.company.eq_ignore_ascii_case(company) {
                return false;
            }
        }
        !self.billable_only || row.is_billable
    }

    pub fn apply(&self, rows: &[NormalizedRow]) -> Vec<NormalizedRow> {
        rows.iter().filter(|r| self.matches(r)).cloned().collect()
    }

    /// The member and date part of the filter only.
    pub fn scope(&self) -> RowFilter {
        RowFilter {
            company: None,
            billable_only: false,
            ..self.clone()
        }
    }
}

/// Weekly overtime for the member-weeks `filter` selects from `rows`.
///
/// Overtime is computed over the member and date scope, so leave and
/// bank-holiday lines keep shaping capacity whatever their company or
/// productivity. The company and billable filters then keep the member-weeks
/// with at least one matching row.
pub fn filtered_weekly_overtime(
    rows: &[NormalizedRow],
    filter: &RowFilter,
    rules: &OvertimeRules,
) -> Vec<MemberWeekOvertime> {
    let scoped = filter.scope().apply(rows);
    let selected: HashSet<(String, String)> = scoped
        .iter()
        .filter(|r| filter.matches(r))
        .map(|r| (normalize_member_name(&r.member), r.iso_week.clone()))
        .collect();
    compute_weekly_overtime(&scoped, rules)
        .into_iter()
        .filter(|w| selected.contains(&(w.member.clone(), w.iso_week.clone())))
        .collect()
}

// ---------------------------------------------------------------------------
// Summary (KPI tiles)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub rows: usize,
    pub members: usize,
    pub total_hours: f64,
    pub billable_hours: f64,
    pub billable_pct: f64,
    pub internal_hours: f64,
    pub internal_pct: f64,
    pub weekend_hours: f64,
    pub overtime_hours: f64,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}

/// Headline figures for `rows`; `weeks` supplies the overtime total.
pub fn get_summary(rows: &[NormalizedRow], weeks: &[MemberWeekOvertime]) -> Summary {
    let members: HashSet<String> = rows.iter().map(|r| normalize_member_name(&r.member)).collect();
    let total_hours: f64 = rows.iter().map(|r| r.hours).sum();
    let billable_hours: f64 = rows.iter().filter(|r| r.is_billable).map(|r| r.hours).sum();
    let internal_hours: f64 = rows.iter().filter(|r| r.is_internal).map(|r| r.hours).sum();
    let weekend_hours: f64 = rows.iter().filter(|r| r.is_weekend).map(|r| r.hours).sum();
    let overtime_hours: f64 = weeks.iter().map(|w| w.overtime.total).sum();

    Summary {
        rows: rows.len(),
        members: members.len(),
        total_hours: round_quarter(total_hours),
        billable_hours: round_quarter(billable_hours),
        billable_pct: pct(billable_hours, total_hours),
        internal_hours: round_quarter(internal_hours),
        internal_pct: pct(internal_hours, total_hours),
        weekend_hours: round_quarter(weekend_hours),
        overtime_hours,
        first_date: rows.iter().map(|r| r.date).min(),
        last_date: rows.iter().map(|r| r.date).max(),
    }
}

// ---------------------------------------------------------------------------
// Hours by member
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberHours {
    pub member: String,
    pub total: f64,
    pub billable: f64,
    pub internal: f64,
    pub utilisation_pct: f64,
}

/// Hours per member, spellings merged, busiest first.
pub fn get_member_hours(rows: &[NormalizedRow]) -> Vec<MemberHours> {
    let mut acc: HashMap<String, (f64, f64, f64)> = HashMap::new();
    for r in rows {
        let e = acc.entry(normalize_member_name(&r.member)).or_default();
        e.0 += r.hours;
        if r.is_billable {
            e.1 += r.hours;
        }
        if r.is_internal {
            e.2 += r.hours;
        }
    }
    let mut out: Vec<MemberHours> = acc
        .into_iter()
        .map(|(member, (total, billable, internal))| MemberHours {
            member,
            total: round_quarter(total),
            billable: round_quarter(billable),
            internal: round_quarter(internal),
            utilisation_pct: pct(billable, total),
        })
        .collect();
    out.sort_by(|a, b| b.total.total_cmp(&a.total).then_with(|| a.member.cmp(&b.member)));
    out
}

// ---------------------------------------------------------------------------
// Utilisation trend
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Period {
    /// Calendar month (YYYY-MM)
    Month,
    /// Fiscal month within the fiscal year
    Fiscal,
    /// ISO week (YYYY-Www)
    Week,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UtilisationPoint {
    pub period: String,
    pub total: f64,
    pub billable: f64,
    pub internal: f64,
    pub utilisation_pct: f64,
}

fn period_key(row: &NormalizedRow, period: Period) -> (String, String) {
    match period {
        Period::Month => (row.calendar_month.clone(), row.calendar_month.clone()),
        Period::Fiscal => (
            format!("{:04}-{:02}", row.fiscal_year, row.fiscal_month),
            format!("{} M{:02}", row.fiscal_year_label, row.fiscal_month),
        ),
        Period::Week => (row.iso_week.clone(), row.iso_week.clone()),
    }
}

/// Billable share of logged hours per period, oldest first.
pub fn get_utilisation(rows: &[NormalizedRow], period: Period) -> Vec<UtilisationPoint> {
    let mut acc: BTreeMap<String, (String, f64, f64, f64)> = BTreeMap::new();
    for r in rows {
        let (sort_key, label) = period_key(r, period);
        let e = acc.entry(sort_key).or_insert_with(|| (label, 0.0, 0.0, 0.0));
        e.1 += r.hours;
        if r.is_billable {
            e.2 += r.hours;
        }
        if r.is_internal {
            e.3 += r.hours;
        }
    }
    acc.into_values()
        .map(|(period, total, billable, internal)| UtilisationPoint {
            period,
            total: round_quarter(total),
            billable: round_quarter(billable),
            internal: round_quarter(internal),
            utilisation_pct: pct(billable, total),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Pareto
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Dimension {
    Member,
    Company,
    Project,
    WorkType,
    BoardWorkType,
    Role,
}

impl Dimension {
    fn value(&self, row: &NormalizedRow) -> String {
        match self {
            Self::Member => normalize_member_name(&row.member),
            Self::Company => row.company.clone(),
            Self::Project => row.project.clone(),
            Self::WorkType => row.work_type.clone(),
            Self::BoardWorkType => row.board_work_type.clone(),
            Self::Role => row.role.clone(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Member => "Member",
            Self::Company => "Company",
            Self::Project => "Project",
            Self::WorkType => "Work Type",
            Self::BoardWorkType => "Board Work Type",
            Self::Role => "Role",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParetoItem {
    pub name: String,
    pub hours: f64,
    pub pct: f64,
    pub cumulative_pct: f64,
}

/// Hours per dimension value, largest first, with running share of total.
pub fn get_pareto(rows: &[NormalizedRow], dimension: Dimension) -> Vec<ParetoItem> {
    let mut acc: HashMap<String, f64> = HashMap::new();
    for r in rows {
        *acc.entry(dimension.value(r)).or_default() += r.hours;
    }
    let total: f64 = acc.values().sum();
    let mut raw: Vec<(String, f64)> = acc.into_iter().collect();
    raw.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let mut running = 0.0f64;
    raw.into_iter()
        .map(|(name, hours)| {
            running += hours;
            ParetoItem {
                name,
                hours: round_quarter(hours),
                pct: pct(hours, total),
                cumulative_pct: pct(running, total),
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Board work types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkTypeItem {
    pub name: String,
    pub hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardWorkTypeGroup {
    pub name: String,
    pub hours: f64,
    pub pct: f64,
    pub work_types: Vec<WorkTypeItem>,
}

/// Hours per board category, each with the raw work types rolled into it.
pub fn get_work_type_breakdown(rows: &[NormalizedRow]) -> Vec<BoardWorkTypeGroup> {
    let mut acc: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();
    for r in rows {
        *acc.entry(r.board_work_type.clone())
            .or_default()
            .entry(r.work_type.clone())
            .or_default() += r.hours;
    }
    let total: f64 = rows.iter().map(|r| r.hours).sum();

    let mut groups: Vec<BoardWorkTypeGroup> = acc
        .into_iter()
        .map(|(name, types)| {
            let hours: f64 = types.values().sum();
            let mut work_types: Vec<WorkTypeItem> = types
                .into_iter()
                .map(|(name, h)| WorkTypeItem {
                    name,
                    hours: round_quarter(h),
                })
                .collect();
            work_types.sort_by(|a, b| b.hours.total_cmp(&a.hours).then_with(|| a.name.cmp(&b.name)));
            BoardWorkTypeGroup {
                name,
                hours: round_quarter(hours),
                pct: pct(hours, total),
                work_types,
            }
        })
        .collect();
    groups.sort_by(|a, b| b.hours.total_cmp(&a.hours).then_with(|| a.name.cmp(&b.name)));
    groups
}

// ---------------------------------------------------------------------------
// Calendar heatmap
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapDay {
    pub date: NaiveDate,
    pub iso_week: String,
    pub day_of_week: u32,
    pub hours: f64,
}

/// Hours per calendar day from the first to the last logged date, with
/// empty days included so the grid has no holes.
pub fn get_heatmap(rows: &[NormalizedRow]) -> Vec<HeatmapDay> {
    let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for r in rows {
        *by_date.entry(r.date).or_default() += r.hours;
    }
    let (Some(first), Some(last)) = (
        by_date.keys().next().copied(),
        by_date.keys().next_back().copied(),
    ) else {
        return Vec::new();
    };

    first
        .iter_days()
        .take_while(|d| *d <= last)
        .map(|date| HeatmapDay {
            date,
            iso_week: iso_week_id(date),
            day_of_week: day_of_week(date),
            hours: round_quarter(by_date.get(&date).copied().unwrap_or(0.0)),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Overtime incidence
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OvertimeIncidence {
    pub member: String,
    pub weeks_logged: usize,
    pub weeks_with_overtime: usize,
    pub incidence_pct: f64,
    pub total_overtime: f64,
    pub avg_overtime_per_week: f64,
    pub peak_week: Option<String>,
    pub peak_overtime: f64,
}

/// How often, and how much, each member works beyond contract.
pub fn get_overtime_incidence(weeks: &[MemberWeekOvertime]) -> Vec<OvertimeIncidence> {
    let mut acc: BTreeMap<String, OvertimeIncidence> = BTreeMap::new();
    for week in weeks {
        let e = acc.entry(week.member.clone()).or_insert_with(|| OvertimeIncidence {
            member: week.member.clone(),
            weeks_logged: 0,
            weeks_with_overtime: 0,
            incidence_pct: 0.0,
            total_overtime: 0.0,
            avg_overtime_per_week: 0.0,
            peak_week: None,
            peak_overtime: 0.0,
        });
        let ot = week.overtime.total;
        e.weeks_logged += 1;
        e.total_overtime += ot;
        if ot > 0.0 {
            e.weeks_with_overtime += 1;
            if ot > e.peak_overtime {
                e.peak_overtime = ot;
                e.peak_week = Some(week.iso_week.clone());
            }
        }
    }

    let mut out: Vec<OvertimeIncidence> = acc
        .into_values()
        .map(|mut e| {
            e.incidence_pct = pct(e.weeks_with_overtime as f64, e.weeks_logged as f64);
            e.avg_overtime_per_week = if e.weeks_logged > 0 {
                e.total_overtime / e.weeks_logged as f64
            } else {
                0.0
            };
            e
        })
        .collect();
    out.sort_by(|a, b| {
        b.total_overtime
            .total_cmp(&a.total_overtime)
            .then_with(|| a.member.cmp(&b.member))
    });
    out
}
