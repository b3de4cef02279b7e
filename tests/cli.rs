//! End-to-end tests for the `timesheet` binary.
#![allow(deprecated)] // assert_cmd::Command::cargo_bin

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const HEADER: &str =
    "Member,Date,Ticket,Work Role,Work Type,Company,Hours,Project/Ticket,Project Type,Role,Productivity";

fn write_csv(dir: &TempDir, lines: &[&str]) -> PathBuf {
    let path = dir.path().join("timesheet.csv");
    let mut content = String::from(HEADER);
    for line in lines {
        content.push('\n');
        content.push_str(line);
    }
    content.push('\n');
    fs::write(&path, content).unwrap();
    path
}

/// Binary pointed at a settings file that does not exist, so defaults apply.
fn timesheet(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("timesheet").unwrap();
    cmd.env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .arg("--config")
        .arg(dir.path().join("settings.json"));
    cmd
}

fn sample(dir: &TempDir) -> PathBuf {
    write_csv(
        dir,
        &[
            "\"Smith, Jo\",04/03/2024,T-1,Developer,Development,Client Co,10,Website,Fixed Price,Developer,Productive",
            "\"Smith, Jo\",05/03/2024,T-2,Developer,Development,Client Co,0,Website,Fixed Price,Developer,Productive",
            "\"Boss, Big\",05/03/2024,T-3,Manager,Admin,Client Co,4,Website,Fixed Price,HoPS,Productive",
            "\"Smith, Jo\",not a date,T-4,Developer,Development,Client Co,3,Website,Fixed Price,Developer,Productive",
            "Mark Bolton,06/03/2024,T-5,Developer,Meeting,Client Co,2,Website,Fixed Price,Developer,Non-Productive",
        ],
    )
}

fn stdout_json(cmd: &mut Command) -> serde_json::Value {
    let out = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&out).unwrap()
}

fn path_arg(p: &Path) -> &str {
    p.to_str().unwrap()
}

#[test]
fn test_check_reports_counts() {
    let dir = TempDir::new().unwrap();
    let csv = sample(&dir);
    timesheet(&dir)
        .arg("check")
        .arg(&csv)
        .assert()
        .success()
        .stdout(predicate::str::contains("Read"))
        .stdout(predicate::str::contains("Skipped: excluded role"))
        .stdout(predicate::str::contains("12.00"));
}

#[test]
fn test_overtime_json_end_to_end() {
    let dir = TempDir::new().unwrap();
    let csv = sample(&dir);
    let json = stdout_json(timesheet(&dir).args(["overtime", path_arg(&csv), "--format", "json"]));

    let weeks = json.as_array().unwrap();
    let jo = weeks
        .iter()
        .find(|w| w["member"] == "Jo Smith")
        .expect("Jo Smith week");
    assert_eq!(jo["isoWeek"], "2024-W10");
    assert_eq!(jo["overtime"]["dailyWeekday"], 2.5);
    assert_eq!(jo["overtime"]["weeklyOverflow"], 0.0);
    assert_eq!(jo["overtime"]["total"], 2.5);

    let mark = weeks.iter().find(|w| w["member"] == "Mark Bolton").unwrap();
    assert_eq!(mark["overtime"]["total"], 0.0);
}

#[test]
fn test_overtime_only_overtime_filter() {
    let dir = TempDir::new().unwrap();
    let csv = sample(&dir);
    let json = stdout_json(timesheet(&dir).args([
        "overtime",
        path_arg(&csv),
        "--format",
        "json",
        "--only-overtime",
    ]));
    let weeks = json.as_array().unwrap();
    assert_eq!(weeks.len(), 1);
    assert_eq!(weeks[0]["member"], "Jo Smith");
}

#[test]
fn test_overtime_table_output() {
    let dir = TempDir::new().unwrap();
    let csv = sample(&dir);
    timesheet(&dir)
        .arg("overtime")
        .arg(&csv)
        .assert()
        .success()
        .stdout(predicate::str::contains("Weekly Overtime"))
        .stdout(predicate::str::contains("Jo Smith"))
        .stdout(predicate::str::contains("2.50"));
}

#[test]
fn test_missing_columns_exit_code() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.csv");
    fs::write(&path, "Member,Date\nJo,04/03/2024\n").unwrap();
    timesheet(&dir)
        .arg("check")
        .arg(&path)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error: Missing required columns"))
        .stderr(predicate::str::contains("Hours"));
}

#[test]
fn test_unreadable_dates_fail_fast() {
    let dir = TempDir::new().unwrap();
    let csv = write_csv(
        &dir,
        &[
            "Jo Smith,2024-03-04,T-1,Developer,Development,Client Co,8,Website,Fixed Price,Developer,Productive",
            "Jo Smith,2024-03-05,T-1,Developer,Development,Client Co,8,Website,Fixed Price,Developer,Productive",
        ],
    );
    timesheet(&dir)
        .arg("check")
        .arg(&csv)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Unreadable dates"));
}

#[test]
fn test_rows_json_has_derived_fields() {
    let dir = TempDir::new().unwrap();
    let csv = sample(&dir);
    let json = stdout_json(timesheet(&dir).args(["rows", path_arg(&csv), "--format", "json"]));
    let rows = json.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["iso_week"], "2024-W10");
    assert_eq!(rows[0]["calendar_month"], "2024-03");
    assert_eq!(rows[0]["is_billable"], true);
    assert_eq!(rows[1]["board_work_type"], "Meetings");
}

#[test]
fn test_rows_csv_to_file_with_member_filter() {
    let dir = TempDir::new().unwrap();
    let csv = sample(&dir);
    let out = dir.path().join("out").join("rows.csv");
    timesheet(&dir)
        .args(["rows", path_arg(&csv), "--member", "Jo Smith", "--output", path_arg(&out)])
        .assert()
        .success();
    let text = fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("member,date,hours"));
    assert!(lines[1].contains("2024-03-04"));
}

#[test]
fn test_from_without_to_is_rejected() {
    let dir = TempDir::new().unwrap();
    let csv = sample(&dir);
    timesheet(&dir)
        .args(["rows", path_arg(&csv), "--from", "2024-03-01"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--from requires --to"));
}

#[test]
fn test_report_summary() {
    let dir = TempDir::new().unwrap();
    let csv = sample(&dir);
    timesheet(&dir)
        .args(["report", "summary", path_arg(&csv)])
        .assert()
        .success()
        .stdout(predicate::str::contains("Summary"))
        .stdout(predicate::str::contains("12.00"))
        .stdout(predicate::str::contains("2024-03-04 to 2024-03-06"));
}

#[test]
fn test_report_summary_json() {
    let dir = TempDir::new().unwrap();
    let csv = sample(&dir);
    let json = stdout_json(timesheet(&dir).args(["report", "summary", path_arg(&csv), "--json"]));
    assert_eq!(json["rows"], 2);
    assert_eq!(json["members"], 2);
    assert_eq!(json["total_hours"], 12.0);
    assert_eq!(json["billable_hours"], 10.0);
    assert_eq!(json["overtime_hours"], 2.5);
}

#[test]
fn test_report_pareto_top() {
    let dir = TempDir::new().unwrap();
    let csv = sample(&dir);
    let json = stdout_json(timesheet(&dir).args([
        "report",
        "pareto",
        path_arg(&csv),
        "--by",
        "member",
        "--top",
        "1",
        "--json",
    ]));
    let items = json.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], "Jo Smith");
}

#[test]
fn test_settings_file_changes_rules() {
    let dir = TempDir::new().unwrap();
    let csv = sample(&dir);
    let settings = dir.path().join("settings.json");
    fs::write(&settings, r#"{"standard_day_hours": 10.0}"#).unwrap();

    let mut cmd = Command::cargo_bin("timesheet").unwrap();
    let json = stdout_json(cmd.env("NO_COLOR", "1").args([
        "--config",
        path_arg(&settings),
        "overtime",
        path_arg(&csv),
        "--format",
        "json",
        "--member",
        "Jo Smith",
    ]));
    assert_eq!(json[0]["overtime"]["total"], 0.0);
}

#[test]
fn test_invalid_settings_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let csv = sample(&dir);
    fs::write(dir.path().join("settings.json"), "{ not json").unwrap();
    timesheet(&dir)
        .arg("check")
        .arg(&csv)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Settings error"));
}

#[test]
fn test_config_init_and_path() {
    let dir = TempDir::new().unwrap();
    timesheet(&dir)
        .args(["config", "--path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("settings.json"));
    timesheet(&dir).args(["config", "--init"]).assert().success();
    assert!(dir.path().join("settings.json").exists());
    timesheet(&dir)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("fiscal_year_start_month"));
}

#[test]
fn test_overtime_accumulates_lines_on_one_day() {
    let dir = TempDir::new().unwrap();
    let csv = write_csv(
        &dir,
        &[
            "\"Smith, Jo\",04/03/2024,T-1,Developer,Development,Client Co,4,Website,Fixed Price,Developer,Productive",
            "\"Smith, Jo\",04/03/2024,T-2,Developer,Testing,Client Co,4,Website,Fixed Price,Developer,Productive",
            "\"Smith, Jo\",04/03/2024,T-3,Developer,Design,Client Co,2,Website,Fixed Price,Developer,Productive",
        ],
    );
    let json = stdout_json(timesheet(&dir).args(["overtime", path_arg(&csv), "--format", "json"]));
    assert_eq!(
        json,
        serde_json::json!([{
            "member": "Jo Smith",
            "isoWeek": "2024-W10",
            "overtime": {
                "dailyWeekday": 2.5,
                "weeklyOverflow": 0.0,
                "weekendHoliday": 0.0,
                "total": 2.5
            }
        }])
    );
}

#[test]
fn test_overtime_filters_keep_leave_in_capacity() {
    let dir = TempDir::new().unwrap();
    let mut lines: Vec<String> = ["04", "05", "06", "07", "08"]
        .iter()
        .map(|d| {
            format!("Jo Smith,{d}/03/2024,T-1,Developer,Development,Client Co,7.5,Website,Fixed Price,Developer,Productive")
        })
        .collect();
    lines.push(
        "Jo Smith,06/03/2024,T-9,Developer,Sick Leave,Us,7.5,Absence,Internal,Developer,Non-Productive".to_string(),
    );
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    let csv = write_csv(&dir, &refs);

    for filter in [
        vec!["--billable-only"],
        vec!["--company", "Client Co"],
        vec![],
    ] {
        let mut args = vec!["overtime", path_arg(&csv), "--format", "json"];
        args.extend(filter);
        let json = stdout_json(timesheet(&dir).args(&args));
        assert_eq!(json[0]["overtime"]["weeklyOverflow"], 7.5, "args: {args:?}");
        assert_eq!(json[0]["overtime"]["total"], 7.5, "args: {args:?}");
    }

    let json = stdout_json(timesheet(&dir).args([
        "report",
        "summary",
        path_arg(&csv),
        "--json",
        "--billable-only",
    ]));
    assert_eq!(json["billable_hours"], 37.5);
    assert_eq!(json["overtime_hours"], 7.5);
}
