use thiserror::Error;

#[derive(Error, Debug)]
pub enum TimesheetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Unreadable dates: none of the first {sampled} rows has a DD/MM/YYYY date (e.g. {example:?})")]
    UnreadableDates { sampled: usize, example: String },

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, TimesheetError>;
