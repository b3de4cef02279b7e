use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, TimesheetError};

/// Contracted hours for a member whose week is not five 7.5h days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberSchedule {
    /// Normalized `First Last` name.
    pub member: String,
    pub monday: f64,
    pub tuesday: f64,
    pub wednesday: f64,
    pub thursday: f64,
    pub friday: f64,
}

/// One rollup rule mapping raw work types onto a board category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkTypeRule {
    pub pattern: String,
    #[serde(default = "default_match_type")]
    pub match_type: String,
    pub category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_fiscal_year_start_month")]
    pub fiscal_year_start_month: u32,
    #[serde(default = "default_excluded_roles")]
    pub excluded_roles: Vec<String>,
    #[serde(default)]
    pub internal_companies: Vec<String>,
    #[serde(default = "default_internal_project_types")]
    pub internal_project_types: Vec<String>,
    /// Extra legacy header → canonical header mappings.
    #[serde(default)]
    pub column_aliases: BTreeMap<String, String>,
    #[serde(default = "default_date_sample_rows")]
    pub date_sample_rows: usize,
    #[serde(default = "default_standard_day_hours")]
    pub standard_day_hours: f64,
    #[serde(default = "default_weekly_capacity_hours")]
    pub weekly_capacity_hours: f64,
    #[serde(default = "default_bank_holiday_capacity_cap")]
    pub bank_holiday_capacity_cap: f64,
    #[serde(default = "default_compressed_schedules")]
    pub compressed_schedules: Vec<MemberSchedule>,
    #[serde(default = "default_work_type_rules")]
    pub work_type_rules: Vec<WorkTypeRule>,
}

fn default_fiscal_year_start_month() -> u32 {
    4
}

fn default_excluded_roles() -> Vec<String> {
    vec!["HoPS".to_string()]
}

fn default_internal_project_types() -> Vec<String> {
    vec!["Internal".to_string()]
}

fn default_date_sample_rows() -> usize {
    3
}

fn default_standard_day_hours() -> f64 {
    7.5
}

fn default_weekly_capacity_hours() -> f64 {
    37.5
}

fn default_bank_holiday_capacity_cap() -> f64 {
    7.5
}

fn default_match_type() -> String {
    "contains".to_string()
}

fn default_compressed_schedules() -> Vec<MemberSchedule> {
    vec![MemberSchedule {
        member: "Mark Bolton".to_string(),
        monday: 8.25,
        tuesday: 8.25,
        wednesday: 8.25,
        thursday: 8.25,
        friday: 4.5,
    }]
}

fn default_work_type_rules() -> Vec<WorkTypeRule> {
    let rule = |pattern: &str, match_type: &str, category: &str| WorkTypeRule {
        pattern: pattern.to_string(),
        match_type: match_type.to_string(),
        category: category.to_string(),
    };
    vec![
        rule("Leave", "contains", "Leave"),
        rule("Training", "contains", "Training"),
        rule("Meeting", "contains", "Meetings"),
        rule("Support", "contains", "Support"),
        rule("Development", "contains", "Delivery"),
        rule("Testing", "contains", "Delivery"),
        rule("Design", "contains", "Delivery"),
        rule("Delivery", "contains", "Delivery"),
        rule("Admin", "starts_with", "Admin"),
    ]
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fiscal_year_start_month: default_fiscal_year_start_month(),
            excluded_roles: default_excluded_roles(),
            internal_companies: Vec::new(),
            internal_project_types: default_internal_project_types(),
            column_aliases: BTreeMap::new(),
            date_sample_rows: default_date_sample_rows(),
            standard_day_hours: default_standard_day_hours(),
            weekly_capacity_hours: default_weekly_capacity_hours(),
            bank_holiday_capacity_cap: default_bank_holiday_capacity_cap(),
            compressed_schedules: default_compressed_schedules(),
            work_type_rules: default_work_type_rules(),
        }
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("timesheet")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

/// Load settings from `path`, or the default location when `None`.
///
/// A missing file yields defaults. A file that exists but cannot be parsed
/// is an error, so a typo in the config never silently changes the rules.
pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(settings_path);
    if !path.exists() {
        debug!(path = %path.display(), "no settings file, using defaults");
        return Ok(Settings::default());
    }
    let content = std::fs::read_to_string(&path)?;
    serde_json::from_str(&content)
        .map_err(|e| TimesheetError::Settings(format!("{}: {e}", path.display())))
}

pub fn save_settings(settings: &Settings, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| TimesheetError::Settings(e.to_string()))?;
    std::fs::write(path, format!("{json}\n"))?;
    Ok(())
}
