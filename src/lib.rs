pub mod calendar;
pub mod categorizer;
pub mod cli;
pub mod columns;
pub mod error;
pub mod fmt;
pub mod importer;
pub mod models;
pub mod overtime;
pub mod reports;
pub mod settings;
