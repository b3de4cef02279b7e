use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::error::Result;

/// Open `output` for writing, or stdout when no path is given.
fn open_writer(output: Option<&Path>) -> Result<Box<dyn Write>> {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            Ok(Box::new(std::fs::File::create(path)?))
        }
        None => Ok(Box::new(std::io::stdout().lock())),
    }
}

pub fn write_csv<T: Serialize>(items: &[T], output: Option<&Path>) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(open_writer(output)?);
    for item in items {
        wtr.serialize(item)?;
    }
    wtr.flush()?;
    report_written(output);
    Ok(())
}

pub fn write_json<T: Serialize + ?Sized>(value: &T, output: Option<&Path>) -> Result<()> {
    let mut out = open_writer(output)?;
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    out.flush()?;
    report_written(output);
    Ok(())
}

/// Write a plain text block to the output file or stdout.
pub fn write_text(text: &str, output: Option<&Path>) -> Result<()> {
    let mut out = open_writer(output)?;
    writeln!(out, "{text}")?;
    out.flush()?;
    report_written(output);
    Ok(())
}

fn report_written(output: Option<&Path>) {
    if let Some(path) = output {
        eprintln!("Wrote {}", path.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OvertimeBreakdown;

    #[test]
    fn test_write_csv_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("rows.csv");
        let items = vec![OvertimeBreakdown {
            daily_weekday: 2.5,
            weekly_overflow: 0.0,
            weekend_holiday: 1.0,
            total: 3.5,
        }];
        write_csv(&items, Some(&path)).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("dailyWeekday,weeklyOverflow,weekendHoliday,total"));
        assert_eq!(lines.next(), Some("2.5,0.0,1.0,3.5"));
    }

    #[test]
    fn test_write_json_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        write_json(&vec![1, 2, 3], Some(&path)).unwrap();
        let parsed: Vec<i32> = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed, vec![1, 2, 3]);
    }
}
