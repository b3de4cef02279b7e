pub mod text;

use serde::Serialize;

use crate::cli::{export, load_import, ReportCommands};
use crate::error::Result;
use crate::overtime::OvertimeRules;
use crate::reports;
use crate::settings::Settings;

pub fn dispatch(cmd: &ReportCommands, settings: &Settings) -> Result<()> {
    let args = cmd.args();
    let (all, filter) = load_import(&args.file, settings, &args.filter)?;
    let rows = filter.apply(&all);
    let rules = OvertimeRules::from_settings(settings);
    let weeks = || reports::filtered_weekly_overtime(&all, &filter, &rules);

    if args.json {
        return match cmd {
            ReportCommands::Summary { .. } => print_json(&reports::get_summary(&rows, &weeks())),
            ReportCommands::Members { .. } => print_json(&reports::get_member_hours(&rows)),
            ReportCommands::Utilisation { period, .. } => {
                print_json(&reports::get_utilisation(&rows, *period))
            }
            ReportCommands::Pareto { by, top, .. } => {
                print_json(&truncate(reports::get_pareto(&rows, *by), *top))
            }
            ReportCommands::WorkTypes { .. } => {
                print_json(&reports::get_work_type_breakdown(&rows))
            }
            ReportCommands::Heatmap { .. } => print_json(&reports::get_heatmap(&rows)),
            ReportCommands::Incidence { .. } => {
                print_json(&reports::get_overtime_incidence(&weeks()))
            }
        };
    }

    let s = match cmd {
        ReportCommands::Summary { .. } => text::format_summary(&reports::get_summary(&rows, &weeks())),
        ReportCommands::Members { .. } => text::format_members(&reports::get_member_hours(&rows)),
        ReportCommands::Utilisation { period, .. } => {
            text::format_utilisation(&reports::get_utilisation(&rows, *period))
        }
        ReportCommands::Pareto { by, top, .. } => {
            text::format_pareto(*by, &truncate(reports::get_pareto(&rows, *by), *top))
        }
        ReportCommands::WorkTypes { .. } => {
            text::format_work_types(&reports::get_work_type_breakdown(&rows))
        }
        ReportCommands::Heatmap { .. } => text::format_heatmap(&reports::get_heatmap(&rows)),
        ReportCommands::Incidence { .. } => {
            text::format_incidence(&reports::get_overtime_incidence(&weeks()))
        }
    };
    println!("{s}");
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    export::write_json(value, None)
}

fn truncate<T>(mut items: Vec<T>, top: Option<usize>) -> Vec<T> {
    if let Some(n) = top {
        items.truncate(n);
    }
    items
}
