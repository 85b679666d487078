//! Command-line front end for `icsconv`.

pub mod cli_args;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use cli_args::{Cli, Command, ConvertArgs, TableCommand};
use icsconv_core::config::{load_config_from, save_config_to};
use icsconv_core::logging::{LoggingDestination, init_logging};
use icsconv_core::{
    FileConfig, LookupTables, TableKind, apply_runtime_overrides, config_path, resolve_tables,
    run_conversion,
};

/// Run a parsed command line.
pub fn run(cli: Cli) -> Result<()> {
    let level = if cli.verbose { "debug" } else { "info" };
    if let Err(err) = init_logging(LoggingDestination::FileAndStderr, level) {
        eprintln!("Warning: file logging unavailable ({err}); logging to stderr only.");
        let _ = init_logging(LoggingDestination::StderrOnly, level);
    }

    let config_file = cli.config.clone().unwrap_or_else(config_path);
    match cli.command {
        Some(Command::Table(cmd)) => {
            if !cli.convert.is_empty() {
                bail!("Conversion flags cannot be combined with table management commands.");
            }
            handle_table_command(cmd, config_file)
        }
        None => run_convert(&cli.convert, config_file),
    }
}

fn load_file_config(config_file: &Path) -> FileConfig {
    let load = load_config_from(config_file);
    for warning in load.warnings {
        eprintln!("Warning: {warning}");
    }
    load.config
}

fn run_convert(args: &ConvertArgs, config_file: PathBuf) -> Result<()> {
    let file_config = load_file_config(&config_file);
    let overrides = args.to_runtime_overrides();
    let conversion =
        apply_runtime_overrides(&file_config, &overrides).map_err(anyhow::Error::msg)?;

    let tables = resolve_tables(&conversion, &file_config.tables)?;
    let summary = run_conversion(&conversion, &tables)?;

    let report = format!(
        "Converted {} rows into {} events ({} merged, {} exam continuations)",
        summary.rows_read, summary.events_written, summary.rows_merged, summary.exams_continued
    );
    match summary.output {
        Some(path) => println!("{report}; wrote {}", path.display()),
        None => eprintln!("{report}"),
    }
    Ok(())
}

fn handle_table_command(command: TableCommand, config_file: PathBuf) -> Result<()> {
    let mut config = load_file_config(&config_file);

    match command {
        TableCommand::List(args) => {
            let kinds: Vec<TableKind> = match args.table {
                Some(table) => vec![table.into()],
                None => vec![TableKind::Abbreviation, TableKind::Location],
            };
            print_tables(&config.tables, &kinds);
            Ok(())
        }
        TableCommand::Set(args) => {
            let key = args.key.trim();
            if key.is_empty() {
                bail!("Table keys cannot be blank.");
            }
            let kind = TableKind::from(args.table);
            let previous = config
                .tables
                .table_mut(kind)
                .insert(key.to_string(), args.value.clone());
            save(&config_file, &config)?;
            match previous {
                Some(old) => println!(
                    "Updated {} entry '{}': '{}' -> '{}'",
                    kind.label(),
                    key,
                    old,
                    args.value
                ),
                None => println!("Added {} entry '{}' = '{}'", kind.label(), key, args.value),
            }
            Ok(())
        }
        TableCommand::Remove(args) => {
            let kind = TableKind::from(args.table);
            if config.tables.table_mut(kind).remove(&args.key).is_none() {
                bail!("No {} entry named '{}'.", kind.label(), args.key);
            }
            save(&config_file, &config)?;
            println!("Removed {} entry '{}'", kind.label(), args.key);
            Ok(())
        }
    }
}

fn print_tables(tables: &LookupTables, kinds: &[TableKind]) {
    for kind in kinds {
        let table = tables.table(*kind);
        println!("[{}]", kind.label());
        if table.is_empty() {
            println!("  (empty)");
        }
        for (key, value) in table {
            println!("  {key} = {value}");
        }
    }
}

fn save(config_file: &Path, config: &FileConfig) -> Result<()> {
    save_config_to(config_file, config)
        .with_context(|| format!("Failed to save {}", config_file.display()))
}
