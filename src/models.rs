use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

/// One CSV line keyed by header name, before alias resolution.
pub type RawRecord = HashMap<String, String>;

pub const UNKNOWN: &str = "Unknown";
pub const PRODUCTIVE: &str = "Productive";

/// A validated timesheet line with its derived calendar and classification
/// fields. Always has `hours > 0`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedRow {
    pub member: String,
    pub date: NaiveDate,
    pub hours: f64,
    pub ticket: String,
    pub work_role: String,
    pub work_type: String,
    pub company: String,
    pub project: String,
    pub project_type: String,
    pub role: String,
    pub productivity: String,
    pub calendar_month: String,
    pub fiscal_year: i32,
    pub fiscal_year_label: String,
    pub fiscal_month: u32,
    pub iso_week: String,
    pub day_of_week: u32,
    pub is_weekend: bool,
    pub is_internal: bool,
    pub is_billable: bool,
    pub board_work_type: String,
}

/// Overtime hours for one member-week, each rounded to the quarter hour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OvertimeBreakdown {
    pub daily_weekday: f64,
    pub weekly_overflow: f64,
    pub weekend_holiday: f64,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberWeekOvertime {
    pub member: String,
    pub iso_week: String,
    pub overtime: OvertimeBreakdown,
}
