//! CLI argument definitions for the `aggr` binary.

use std::path::PathBuf;

use aggr_core::MasterJoin;
use aggr_model::{Objective, Platform};
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "aggr",
    version,
    about = "Reconcile Zomato and Swiggy partner exports into one canonical table",
    long_about = "Reconcile food-delivery aggregator exports.\n\n\
                  Reads a multi-tab Zomato or Swiggy workbook (Excel file or a folder of\n\
                  CSV sheets), standardizes column names, aggregates every tab to one row\n\
                  per restaurant and period, joins the tabs and fills index gaps."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Standardize a platform workbook into the canonical table.
    Standardize(StandardizeArgs),

    /// Standardize a single-sheet review export.
    Review(ReviewArgs),

    /// List the tab catalogue of a platform.
    Tabs(TabsArgs),
}

#[derive(Args)]
pub struct AliasArgs {
    /// Alias mapping JSON file used instead of the built-in defaults.
    #[arg(long = "aliases", value_name = "FILE", conflicts_with = "alias_dir")]
    pub aliases: Option<PathBuf>,

    /// Directory holding `<platform>.json` overrides laid over the defaults.
    #[arg(long = "alias-dir", value_name = "DIR")]
    pub alias_dir: Option<PathBuf>,
}

#[derive(Parser)]
pub struct StandardizeArgs {
    /// Workbook file (.xlsx, .xls, .ods, .csv) or folder of CSV sheets.
    #[arg(value_name = "WORKBOOK")]
    pub workbook: PathBuf,

    #[arg(long = "platform", value_enum)]
    pub platform: PlatformArg,

    /// Run objective; decides the join mode and mandatory tabs.
    #[arg(long = "objective", value_enum, default_value = "ads-optimization")]
    pub objective: ObjectiveArg,

    #[command(flatten)]
    pub aliases: AliasArgs,

    /// Mandatory tab (repeatable). Replaces the platform defaults.
    #[arg(long = "mandatory-tab", value_name = "TAB")]
    pub mandatory_tabs: Vec<String>,

    /// Restaurant master data CSV (client_id,res_id,brand,city,sub_zone).
    #[arg(long = "master-data", value_name = "CSV", requires = "client_id")]
    pub master_data: Option<PathBuf>,

    /// Client whose restaurants are joined onto the table.
    #[arg(long = "client-id", value_name = "N", requires = "master_data")]
    pub client_id: Option<i64>,

    #[arg(long = "master-join", value_enum, default_value = "inner")]
    pub master_join: MasterJoinArg,

    /// Output directory (default: `output` next to the workbook).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Run the pipeline and report without writing output files.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Parser)]
pub struct ReviewArgs {
    /// Review workbook with exactly one sheet.
    #[arg(value_name = "WORKBOOK")]
    pub workbook: PathBuf,

    #[arg(long = "platform", value_enum)]
    pub platform: PlatformArg,

    #[command(flatten)]
    pub aliases: AliasArgs,

    /// Output directory (default: `output` next to the workbook).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Parser)]
pub struct TabsArgs {
    #[arg(long = "platform", value_enum)]
    pub platform: PlatformArg,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum PlatformArg {
    Zomato,
    Swiggy,
}

impl From<PlatformArg> for Platform {
    fn from(value: PlatformArg) -> Self {
        match value {
            PlatformArg::Zomato => Platform::Zomato,
            PlatformArg::Swiggy => Platform::Swiggy,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ObjectiveArg {
    AdsOptimization,
    Visualization,
}

impl From<ObjectiveArg> for Objective {
    fn from(value: ObjectiveArg) -> Self {
        match value {
            ObjectiveArg::AdsOptimization => Objective::AdsOptimization,
            ObjectiveArg::Visualization => Objective::Visualization,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum MasterJoinArg {
    Inner,
    Left,
}

impl From<MasterJoinArg> for MasterJoin {
    fn from(value: MasterJoinArg) -> Self {
        match value {
            MasterJoinArg::Inner => MasterJoin::Inner,
            MasterJoinArg::Left => MasterJoin::Left,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
