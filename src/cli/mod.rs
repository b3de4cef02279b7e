pub mod check;
pub mod config;
pub mod export;
pub mod overtime;
pub mod report;
pub mod rows;

use std::path::{Path, PathBuf};

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::error::Result;
use crate::importer::parse_csv_file;
use crate::models::NormalizedRow;
use crate::reports::{Dimension, Period, RowFilter};
use crate::settings::{load_settings, Settings};

#[derive(Parser)]
#[command(
    name = "timesheet",
    version,
    about = "Timesheet CSV normalization, utilisation reports and weekly overtime."
)]
pub struct Cli {
    /// Settings file (default: ~/.config/timesheet/settings.json)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log more (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate a timesheet CSV and show how many rows survive normalization.
    Check {
        /// Timesheet CSV export
        file: PathBuf,
    },
    /// Write the normalized rows (with derived fields) as CSV or JSON.
    Rows {
        /// Timesheet CSV export
        file: PathBuf,
        #[arg(long, value_enum, default_value = "csv")]
        format: DataFormat,
        /// Output file (default: stdout)
        #[arg(long)]
        output: Option<PathBuf>,
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Weekly overtime per member.
    Overtime {
        /// Timesheet CSV export
        file: PathBuf,
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
        /// Only this ISO week, e.g. 2024-W10
        #[arg(long)]
        week: Option<String>,
        /// Hide member-weeks without overtime
        #[arg(long = "only-overtime")]
        only_overtime: bool,
        /// Output file (default: stdout)
        #[arg(long)]
        output: Option<PathBuf>,
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Dashboard reports.
    Report {
        #[command(subcommand)]
        command: ReportCommands,
    },
    /// Show or initialize the settings file.
    Config {
        /// Only print the settings file location
        #[arg(long)]
        path: bool,
        /// Write the default settings to the settings file
        #[arg(long)]
        init: bool,
        /// Overwrite an existing settings file with --init
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Headline totals: hours, billable and internal share, overtime.
    Summary {
        #[command(flatten)]
        args: ReportArgs,
    },
    /// Hours per member with utilisation.
    Members {
        #[command(flatten)]
        args: ReportArgs,
    },
    /// Utilisation trend per period.
    Utilisation {
        #[command(flatten)]
        args: ReportArgs,
        #[arg(long, value_enum, default_value = "month")]
        period: Period,
    },
    /// Pareto of hours by a dimension.
    Pareto {
        #[command(flatten)]
        args: ReportArgs,
        #[arg(long = "by", value_enum, default_value = "project")]
        by: Dimension,
        /// Show only the largest N entries
        #[arg(long)]
        top: Option<usize>,
    },
    /// Hours per board work type with the raw work types behind each.
    WorkTypes {
        #[command(flatten)]
        args: ReportArgs,
    },
    /// Hours per calendar day.
    Heatmap {
        #[command(flatten)]
        args: ReportArgs,
    },
    /// Overtime frequency and volume per member.
    Incidence {
        #[command(flatten)]
        args: ReportArgs,
    },
}

impl ReportCommands {
    pub fn args(&self) -> &ReportArgs {
        match self {
            Self::Summary { args }
            | Self::Members { args }
            | Self::Utilisation { args, .. }
            | Self::Pareto { args, .. }
            | Self::WorkTypes { args }
            | Self::Heatmap { args }
            | Self::Incidence { args } => args,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
    /// Timesheet CSV export
    pub file: PathBuf,
    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
    #[command(flatten)]
    pub filter: FilterArgs,
}

#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Member name ("First Last" or "Last, First")
    #[arg(long)]
    pub member: Option<String>,
    /// Start date: YYYY-MM-DD
    #[arg(long = "from")]
    pub from_date: Option<String>,
    /// End date: YYYY-MM-DD
    #[arg(long = "to")]
    pub to_date: Option<String>,
    /// Month filter: YYYY-MM
    #[arg(long)]
    pub month: Option<String>,
    #[arg(long)]
    pub company: Option<String>,
    /// Only rows marked Productive
    #[arg(long = "billable-only")]
    pub billable_only: bool,
}

impl FilterArgs {
    pub fn to_filter(&self) -> Result<RowFilter> {
        RowFilter::from_args(
            self.member.as_deref(),
            self.from_date.as_deref(),
            self.to_date.as_deref(),
            self.month.as_deref(),
            self.company.as_deref(),
            self.billable_only,
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum DataFormat {
    Csv,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Csv,
    Json,
}

/// Parse `file` and validate the filter, returning every kept row.
pub(crate) fn load_import(
    file: &Path,
    settings: &Settings,
    filter: &FilterArgs,
) -> Result<(Vec<NormalizedRow>, RowFilter)> {
    let filter = filter.to_filter()?;
    let import = parse_csv_file(file, settings)?;
    Ok((import.rows, filter))
}

/// Parse `file` and apply the filter.
pub(crate) fn load_rows(file: &Path, settings: &Settings, filter: &FilterArgs) -> Result<Vec<NormalizedRow>> {
    let (rows, filter) = load_import(file, settings, filter)?;
    Ok(filter.apply(&rows))
}

pub fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();
    let settings = || load_settings(config_path);
    match cli.command {
        Commands::Check { file } => check::run(&file, &settings()?),
        Commands::Rows {
            file,
            format,
            output,
            filter,
        } => rows::run(&file, &settings()?, format, output.as_deref(), &filter),
        Commands::Overtime {
            file,
            format,
            week,
            only_overtime,
            output,
            filter,
        } => overtime::run(
            &file,
            &settings()?,
            format,
            week.as_deref(),
            only_overtime,
            output.as_deref(),
            &filter,
        ),
        Commands::Report { command } => report::dispatch(&command, &settings()?),
        Commands::Config { path, init, force } => config::run(config_path, path, init, force),
    }
}
