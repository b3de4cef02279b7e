use std::path::Path;

use crate::cli::{export, load_rows, DataFormat, FilterArgs};
use crate::error::Result;
use crate::settings::Settings;

pub fn run(
    file: &Path,
    settings: &Settings,
    format: DataFormat,
    output: Option<&Path>,
    filter: &FilterArgs,
) -> Result<()> {
    let rows = load_rows(file, settings, filter)?;
    match format {
        DataFormat::Csv => export::write_csv(&rows, output),
        DataFormat::Json => export::write_json(&rows, output),
    }
}
