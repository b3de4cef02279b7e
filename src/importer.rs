use std::io::Read;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::calendar::{
    calendar_month, day_of_week, fiscal_period, fiscal_year_label, is_weekend, iso_week_id,
    parse_uk_date,
};
use crate::categorizer::Classifier;
use crate::columns::{self, clean_header, AliasTable};
use crate::error::{Result, TimesheetError};
use crate::models::{NormalizedRow, RawRecord, PRODUCTIVE, UNKNOWN};
use crate::settings::Settings;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse an hours cell. Thousands separators are stripped; anything that is
/// not a finite number becomes 0.
pub fn parse_hours(raw: &str) -> f64 {
    let s = raw.replace(',', "");
    match s.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

fn text_or_unknown(record: &RawRecord, key: &str) -> String {
    match record.get(key).map(|v| v.trim()) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => UNKNOWN.to_string(),
    }
}

fn raw_value<'a>(record: &'a RawRecord, key: &str) -> &'a str {
    record.get(key).map(|v| v.as_str()).unwrap_or("")
}

// ---------------------------------------------------------------------------
// Import result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NonPositiveHours,
    ExcludedRole,
    InvalidDate,
}

/// Row counts for one import. Individual skipped rows are not reported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub rows_read: usize,
    pub rows_kept: usize,
    pub skipped_hours: usize,
    pub skipped_role: usize,
    pub skipped_date: usize,
}

impl ImportReport {
    pub fn skipped(&self) -> usize {
        self.skipped_hours + self.skipped_role + self.skipped_date
    }

    fn record_skip(&mut self, reason: SkipReason) {
        match reason {
            SkipReason::NonPositiveHours => self.skipped_hours += 1,
            SkipReason::ExcludedRole => self.skipped_role += 1,
            SkipReason::InvalidDate => self.skipped_date += 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Import {
    pub rows: Vec<NormalizedRow>,
    pub report: ImportReport,
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// Read a CSV with a header row into cleaned headers and raw records.
/// Short lines simply lack the trailing keys; duplicate headers keep the
/// first column.
pub fn read_raw_records<R: Read>(reader: R) -> Result<(Vec<String>, Vec<RawRecord>)> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let headers: Vec<String> = rdr.headers()?.iter().map(clean_header).collect();

    let mut records = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let mut raw = RawRecord::with_capacity(headers.len());
        for (name, value) in headers.iter().zip(record.iter()) {
            raw.entry(name.clone()).or_insert_with(|| value.to_string());
        }
        records.push(raw);
    }
    Ok((headers, records))
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Turns resolved raw records into [`NormalizedRow`]s.
pub struct Normalizer<'a> {
    settings: &'a Settings,
    classifier: Classifier,
}

impl<'a> Normalizer<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self {
            settings,
            classifier: Classifier::new(settings),
        }
    }

    pub fn normalize(&self, record: &RawRecord) -> std::result::Result<NormalizedRow, SkipReason> {
        let hours = parse_hours(raw_value(record, columns::HOURS));
        if hours <= 0.0 {
            return Err(SkipReason::NonPositiveHours);
        }

        let role = text_or_unknown(record, columns::ROLE);
        if self.settings.excluded_roles.iter().any(|r| r.trim() == role) {
            return Err(SkipReason::ExcludedRole);
        }

        let date = parse_uk_date(raw_value(record, columns::DATE)).ok_or(SkipReason::InvalidDate)?;

        let company = text_or_unknown(record, columns::COMPANY);
        let project_type = text_or_unknown(record, columns::PROJECT_TYPE);
        let work_type = text_or_unknown(record, columns::WORK_TYPE);
        let productivity = text_or_unknown(record, columns::PRODUCTIVITY);
        let start_month = self.settings.fiscal_year_start_month;
        let (fiscal_year, fiscal_month) = fiscal_period(date, start_month);

        Ok(NormalizedRow {
            member: text_or_unknown(record, columns::MEMBER),
            date,
            hours,
            ticket: text_or_unknown(record, columns::TICKET),
            work_role: text_or_unknown(record, columns::WORK_ROLE),
            board_work_type: self.classifier.board_work_type(&work_type),
            is_internal: self.classifier.is_internal(&company, &project_type),
            is_billable: productivity == PRODUCTIVE,
            work_type,
            company,
            project: text_or_unknown(record, columns::PROJECT),
            project_type,
            role,
            productivity,
            calendar_month: calendar_month(date),
            fiscal_year,
            fiscal_year_label: fiscal_year_label(fiscal_year, start_month),
            fiscal_month,
            iso_week: iso_week_id(date),
            day_of_week: day_of_week(date),
            is_weekend: is_weekend(date),
        })
    }
}

/// Fail fast when the date column is in the wrong format altogether: every
/// one of the first few non-blank dates is unreadable.
fn check_date_sample(records: &[RawRecord], sample_size: usize) -> Result<()> {
    if sample_size == 0 {
        return Ok(());
    }
    let sample: Vec<&str> = records
        .iter()
        .map(|r| raw_value(r, columns::DATE).trim())
        .filter(|d| !d.is_empty())
        .take(sample_size)
        .collect();
    if !sample.is_empty() && sample.iter().all(|d| parse_uk_date(d).is_none()) {
        return Err(TimesheetError::UnreadableDates {
            sampled: sample.len(),
            example: sample[0].to_string(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// parse_csv_*
// ---------------------------------------------------------------------------

pub fn parse_csv_reader<R: Read>(reader: R, settings: &Settings) -> Result<Import> {
    let (headers, mut records) = read_raw_records(reader)?;

    let aliases = AliasTable::new(&settings.column_aliases);
    let missing = aliases.missing_headers(&headers);
    if !missing.is_empty() {
        return Err(TimesheetError::MissingColumns(missing));
    }

    for record in &mut records {
        aliases.resolve(record);
    }
    check_date_sample(&records, settings.date_sample_rows)?;

    let normalizer = Normalizer::new(settings);
    let mut report = ImportReport {
        rows_read: records.len(),
        ..ImportReport::default()
    };
    let mut rows = Vec::with_capacity(records.len());
    for (idx, record) in records.iter().enumerate() {
        match normalizer.normalize(record) {
            Ok(row) => rows.push(row),
            Err(reason) => {
                // +2: one for the header line, one for 1-based numbering.
                debug!(line = idx + 2, ?reason, "skipping timesheet row");
                report.record_skip(reason);
            }
        }
    }
    report.rows_kept = rows.len();

    if report.skipped_date > 0 {
        warn!(count = report.skipped_date, "rows with unreadable dates were skipped");
    }

    info!(
        read = report.rows_read,
        kept = report.rows_kept,
        skipped = report.skipped(),
        "timesheet parsed"
    );
    Ok(Import { rows, report })
}

pub fn parse_csv_str(text: &str, settings: &Settings) -> Result<Import> {
    parse_csv_reader(text.as_bytes(), settings)
}

pub fn parse_csv_file(path: &Path, settings: &Settings) -> Result<Import> {
    let file = std::fs::File::open(path)?;
    parse_csv_reader(std::io::BufReader::new(file), settings)
}
