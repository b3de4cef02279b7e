use std::collections::BTreeMap;

use crate::models::RawRecord;

pub const MEMBER: &str = "Member";
pub const DATE: &str = "Date";
pub const TICKET: &str = "Ticket";
pub const WORK_ROLE: &str = "Work Role";
pub const WORK_TYPE: &str = "Work Type";
pub const COMPANY: &str = "Company";
pub const HOURS: &str = "Hours";
pub const PROJECT: &str = "Project/Ticket";
pub const PROJECT_TYPE: &str = "Project Type";
pub const ROLE: &str = "Role";
pub const PRODUCTIVITY: &str = "Productivity";

/// Every column a timesheet export must provide, directly or via an alias.
pub const CANONICAL_HEADERS: &[&str] = &[
    MEMBER,
    DATE,
    TICKET,
    WORK_ROLE,
    WORK_TYPE,
    COMPANY,
    HOURS,
    PROJECT,
    PROJECT_TYPE,
    ROLE,
    PRODUCTIVITY,
];

/// Older exports used these names (legacy → canonical).
pub const LEGACY_ALIASES: &[(&str, &str)] = &[
    ("Team", ROLE),
    ("Date  (dd/MM/yyyy)", DATE),
];

/// Legacy → canonical lookup: the built-in table plus configured extras.
pub struct AliasTable {
    aliases: Vec<(String, String)>,
}

impl AliasTable {
    pub fn new(extra: &BTreeMap<String, String>) -> Self {
        let mut aliases: Vec<(String, String)> = LEGACY_ALIASES
            .iter()
            .map(|(legacy, canonical)| (legacy.to_string(), canonical.to_string()))
            .collect();
        for (legacy, canonical) in extra {
            aliases.push((legacy.trim().to_string(), canonical.trim().to_string()));
        }
        Self { aliases }
    }

    fn legacy_names<'a>(&'a self, canonical: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.aliases
            .iter()
            .filter(move |(_, c)| c == canonical)
            .map(|(l, _)| l.as_str())
    }

    /// Canonical headers with neither a direct nor an aliased column, in
    /// canonical order.
    pub fn missing_headers(&self, headers: &[String]) -> Vec<String> {
        let present = |name: &str| headers.iter().any(|h| h.as_str() == name);
        CANONICAL_HEADERS
            .iter()
            .copied()
            .filter(|canonical| {
                !present(canonical) && !self.legacy_names(canonical).any(|legacy| present(legacy))
            })
            .map(str::to_string)
            .collect()
    }

    /// Copy legacy values onto their canonical keys. Legacy keys stay in the
    /// record; an existing non-blank canonical value is never overwritten.
    pub fn resolve(&self, record: &mut RawRecord) {
        for (legacy, canonical) in &self.aliases {
            let Some(value) = record.get(legacy).cloned() else {
                continue;
            };
            let canonical_blank = record
                .get(canonical)
                .map_or(true, |v| v.trim().is_empty());
            if canonical_blank {
                record.insert(canonical.clone(), value);
            }
        }
    }
}

/// Strip whitespace and a leading UTF-8 BOM from header cells.
pub fn clean_header(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}').trim().to_string()
}
