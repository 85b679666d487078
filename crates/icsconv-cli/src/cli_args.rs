use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum, ValueHint};
use icsconv_core::{RuntimeOverrides, TableKind};

/// Top-level CLI entrypoint.
#[derive(Parser, Debug, Clone)]
#[command(
    version,
    about = "Convert a term calendar export into a calendar-import CSV",
    long_about = None
)]
pub struct Cli {
    /// Use this config file instead of the per-user config.toml.
    #[arg(long, global = true, value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Log at debug level (per-row merge decisions).
    #[arg(short, long, global = true, action = ArgAction::SetTrue)]
    pub verbose: bool,

    #[command(flatten)]
    pub convert: ConvertArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Supported subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Inspect or edit the abbreviation and location tables.
    #[command(subcommand)]
    Table(TableCommand),
}

/// Lookup table management subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum TableCommand {
    /// Print table entries.
    #[command(alias = "ls")]
    List(TableListArgs),
    /// Add or replace an entry.
    #[command(alias = "add")]
    Set(TableSetArgs),
    /// Delete an entry.
    #[command(alias = "rm")]
    Remove(TableRemoveArgs),
}

/// Table selector accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TableArg {
    /// Course name to display abbreviation.
    #[value(alias = "abbreviation")]
    Abbrev,
    /// Location key or elective course to room.
    Location,
}

impl From<TableArg> for TableKind {
    fn from(value: TableArg) -> Self {
        match value {
            TableArg::Abbrev => TableKind::Abbreviation,
            TableArg::Location => TableKind::Location,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct TableListArgs {
    /// Only list this table.
    #[arg(value_enum)]
    pub table: Option<TableArg>,
}

#[derive(Debug, Clone, Args)]
pub struct TableSetArgs {
    #[arg(value_enum)]
    pub table: TableArg,
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Args)]
pub struct TableRemoveArgs {
    #[arg(value_enum)]
    pub table: TableArg,
    pub key: String,
}

/// Arguments for the conversion flow (default command).
#[derive(Debug, Clone, Args, Default)]
pub struct ConvertArgs {
    /// Calendar export to convert.
    #[arg(value_name = "INFILE", value_hint = ValueHint::FilePath)]
    pub input: Option<String>,

    /// Output CSV path (defaults to `<INFILE stem>_轉檔.csv`).
    #[arg(short, long, value_name = "OUTFILE", value_hint = ValueHint::FilePath)]
    pub output: Option<String>,

    /// Input character encoding label (e.g. big5, utf-8).
    #[arg(short, long, value_name = "LABEL")]
    pub encoding: Option<String>,

    /// TOML file with [abbreviations] and [locations] tables for this run.
    #[arg(long, value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub tables: Option<String>,

    /// Write the converted table to stdout instead of a file.
    #[arg(long, action = ArgAction::SetTrue)]
    pub dry_run: bool,
}

impl ConvertArgs {
    /// Returns true when no conversion flags were provided.
    pub fn is_empty(&self) -> bool {
        self.input.is_none()
            && self.output.is_none()
            && self.encoding.is_none()
            && self.tables.is_none()
            && !self.dry_run
    }

    /// Convert CLI flags into runtime overrides.
    pub fn to_runtime_overrides(&self) -> RuntimeOverrides {
        RuntimeOverrides {
            input: self.input.as_deref().and_then(parse_optional_field),
            output: self.output.as_deref().and_then(parse_optional_field),
            encoding: self.encoding.as_deref().and_then(parse_optional_field),
            tables: self.tables.as_deref().and_then(parse_optional_field),
            dry_run: self.dry_run.then_some(true),
        }
    }
}

fn parse_optional_field(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
