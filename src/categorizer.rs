use regex::Regex;

use crate::settings::{Settings, WorkTypeRule};

pub const FALLBACK_BOARD_WORK_TYPE: &str = "Other";

fn matches(work_type: &str, pattern: &str, match_type: &str) -> bool {
    let wt_upper = work_type.to_uppercase();
    let pat_upper = pattern.to_uppercase();
    match match_type {
        "contains" => wt_upper.contains(&pat_upper),
        "starts_with" => wt_upper.starts_with(&pat_upper),
        "exact" => wt_upper == pat_upper,
        "regex" => Regex::new(pattern)
            .map(|re| re.is_match(work_type))
            .unwrap_or(false),
        _ => false,
    }
}

/// Row classifier built once per import from [`Settings`].
pub struct Classifier {
    rules: Vec<WorkTypeRule>,
    internal_companies: Vec<String>,
    internal_project_types: Vec<String>,
}

impl Classifier {
    pub fn new(settings: &Settings) -> Self {
        let lower = |v: &[String]| v.iter().map(|s| s.trim().to_lowercase()).collect();
        Self {
            rules: settings.work_type_rules.clone(),
            internal_companies: lower(&settings.internal_companies),
            internal_project_types: lower(&settings.internal_project_types),
        }
    }

    /// First matching rule wins; unmatched work types roll up to `Other`.
    pub fn board_work_type(&self, work_type: &str) -> String {
        self.rules
            .iter()
            .find(|r| matches(work_type, &r.pattern, &r.match_type))
            .map(|r| r.category.clone())
            .unwrap_or_else(|| FALLBACK_BOARD_WORK_TYPE.to_string())
    }

    pub fn is_internal(&self, company: &str, project_type: &str) -> bool {
        let company = company.trim().to_lowercase();
        let project_type = project_type.trim().to_lowercase();
        self.internal_companies.contains(&company)
            || self.internal_project_types.contains(&project_type)
    }
}
