//! Weekly overtime per member.
//!
//! Each member-week gets three overtime figures:
//!
//! - **daily weekday**: productive hours above the member's baseline on an
//!   ordinary weekday.
//! - **weekly overflow**: base-portion hours that no longer fit in the week
//!   once leave, sickness and training have shrunk its capacity.
//! - **weekend/holiday**: every productive hour on a Saturday, Sunday or a
//!   day with a bank-holiday leave entry.
//!
//! Sums are accumulated unrounded and rounded to the quarter hour only when
//! the output is built.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, Weekday};

use crate::calendar::{is_weekend, iso_week_id, parse_uk_date};
use crate::models::{MemberWeekOvertime, NormalizedRow, OvertimeBreakdown, PRODUCTIVE};
use crate::settings::{MemberSchedule, Settings};

pub const BANK_HOLIDAY_LEAVE: &str = "Bank/Holiday Leave";
pub const NON_WORKING_WORK_TYPES: &[&str] = &[BANK_HOLIDAY_LEAVE, "Sick Leave", "Training"];

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Round to the nearest quarter hour.
pub fn round_quarter(hours: f64) -> f64 {
    (hours * 4.0).round() / 4.0
}

/// `"Bolton, Mark"` → `"Mark Bolton"`. Names without a comma are trimmed.
pub fn normalize_member_name(raw: &str) -> String {
    match raw.split_once(',') {
        Some((last, first)) => {
            let (last, first) = (last.trim(), first.trim());
            match (first.is_empty(), last.is_empty()) {
                (true, _) => last.to_string(),
                (false, true) => first.to_string(),
                (false, false) => format!("{first} {last}"),
            }
        }
        None => raw.trim().to_string(),
    }
}

// ---------------------------------------------------------------------------
// Input shape
// ---------------------------------------------------------------------------

/// The minimal view of a timesheet line the overtime engine needs.
pub trait WorkEntry {
    fn member(&self) -> &str;
    /// `None` when the entry's date cannot be read; such entries are skipped.
    fn date(&self) -> Option<NaiveDate>;
    fn hours(&self) -> f64;
    fn productivity(&self) -> &str;
    fn work_type(&self) -> &str;
}

impl WorkEntry for NormalizedRow {
    fn member(&self) -> &str {
        &self.member
    }
    fn date(&self) -> Option<NaiveDate> {
        Some(self.date)
    }
    fn hours(&self) -> f64 {
        self.hours
    }
    fn productivity(&self) -> &str {
        &self.productivity
    }
    fn work_type(&self) -> &str {
        &self.work_type
    }
}

/// A string-shaped entry, as produced by callers that never went through
/// the importer. The date is re-read with the importer's date matcher.
#[derive(Debug, Clone, PartialEq)]
pub struct RawEntry {
    pub member: String,
    pub date: String,
    pub hours: f64,
    pub productivity: String,
    pub work_type: String,
}

impl WorkEntry for RawEntry {
    fn member(&self) -> &str {
        &self.member
    }
    fn date(&self) -> Option<NaiveDate> {
        parse_uk_date(&self.date)
    }
    fn hours(&self) -> f64 {
        self.hours
    }
    fn productivity(&self) -> &str {
        &self.productivity
    }
    fn work_type(&self) -> &str {
        &self.work_type
    }
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// Contracted-hours rules the overtime split is measured against.
#[derive(Debug, Clone, PartialEq)]
pub struct OvertimeRules {
    pub standard_day_hours: f64,
    pub weekly_capacity_hours: f64,
    pub bank_holiday_capacity_cap: f64,
    pub schedules: Vec<MemberSchedule>,
}

impl Default for OvertimeRules {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl OvertimeRules {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            standard_day_hours: settings.standard_day_hours,
            weekly_capacity_hours: settings.weekly_capacity_hours,
            bank_holiday_capacity_cap: settings.bank_holiday_capacity_cap,
            schedules: settings
                .compressed_schedules
                .iter()
                .map(|s| MemberSchedule {
                    member: normalize_member_name(&s.member),
                    ..s.clone()
                })
                .collect(),
        }
    }

    /// Expected hours for `member` (already normalized) on `date`.
    pub fn daily_baseline(&self, member: &str, date: NaiveDate) -> f64 {
        if is_weekend(date) {
            return 0.0;
        }
        let Some(schedule) = self.schedules.iter().find(|s| s.member == member) else {
            return self.standard_day_hours;
        };
        match date.weekday() {
            Weekday::Mon => schedule.monday,
            Weekday::Tue => schedule.tuesday,
            Weekday::Wed => schedule.wednesday,
            Weekday::Thu => schedule.thursday,
            Weekday::Fri => schedule.friday,
            Weekday::Sat | Weekday::Sun => 0.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct DayBucket {
    productive_hours: f64,
    non_working_hours: f64,
    is_bank_holiday: bool,
}

#[derive(Debug, Default)]
struct WeekTally {
    daily_weekday: f64,
    weekend_holiday: f64,
    baseline_pool: f64,
    capacity_reduction: f64,
}

type DayKey = (String, NaiveDate);

fn bucket_days<E: WorkEntry>(entries: &[E]) -> BTreeMap<DayKey, DayBucket> {
    let mut days: BTreeMap<DayKey, DayBucket> = BTreeMap::new();
    for entry in entries {
        let Some(date) = entry.date() else {
            continue;
        };
        let hours = entry.hours();
        if !hours.is_finite() {
            continue;
        }
        let bucket = days
            .entry((normalize_member_name(entry.member()), date))
            .or_default();
        let work_type = entry.work_type().trim();
        if entry.productivity().trim() == PRODUCTIVE {
            bucket.productive_hours += hours;
        }
        if NON_WORKING_WORK_TYPES.contains(&work_type) {
            bucket.non_working_hours += hours;
        }
        if work_type == BANK_HOLIDAY_LEAVE {
            bucket.is_bank_holiday = true;
        }
    }
    days
}

/// One [`MemberWeekOvertime`] per (normalized member, ISO week) seen in
/// `entries`, ordered by member then week.
pub fn compute_weekly_overtime<E: WorkEntry>(
    entries: &[E],
    rules: &OvertimeRules,
) -> Vec<MemberWeekOvertime> {
    let mut weeks: BTreeMap<(String, String), WeekTally> = BTreeMap::new();

    for ((member, date), day) in bucket_days(entries) {
        let baseline = rules.daily_baseline(&member, date);
        let tally = weeks.entry((member, iso_week_id(date))).or_default();

        if is_weekend(date) {
            tally.weekend_holiday += day.productive_hours;
        } else if day.is_bank_holiday {
            tally.weekend_holiday += day.productive_hours;
            tally.capacity_reduction += day.non_working_hours.min(rules.bank_holiday_capacity_cap);
        } else {
            tally.baseline_pool += day.productive_hours.min(baseline);
            tally.daily_weekday += (day.productive_hours - baseline).max(0.0);
            tally.capacity_reduction += day.non_working_hours.min(baseline);
        }
    }

    weeks
        .into_iter()
        .map(|((member, iso_week), t)| {
            let capacity = (rules.weekly_capacity_hours - t.capacity_reduction).max(0.0);
            let weekly_overflow = (t.baseline_pool - capacity).max(0.0);
            let total = t.daily_weekday + weekly_overflow + t.weekend_holiday;
            MemberWeekOvertime {
                member,
                iso_week,
                overtime: OvertimeBreakdown {
                    daily_weekday: round_quarter(t.daily_weekday),
                    weekly_overflow: round_quarter(weekly_overflow),
                    weekend_holiday: round_quarter(t.weekend_holiday),
                    total: round_quarter(total),
                },
            }
        })
        .collect()
}
