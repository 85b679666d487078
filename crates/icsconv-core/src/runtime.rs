use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::info;

use crate::error::ConvertError;
use crate::lookup::LookupTables;
use crate::merge::{Merger, RowOutcome};
use crate::reader::{ColumnNames, read_raw_events};
use crate::writer::{write_events, write_output_file};

/// Suffix appended to the input file stem when no output path is given.
pub const DEFAULT_OUTPUT_SUFFIX: &str = "_轉檔";

/// Effective settings for one conversion run.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionConfig {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub encoding: String,
    pub tables_path: Option<PathBuf>,
    pub columns: ColumnNames,
    pub dry_run: bool,
}

impl ConversionConfig {
    /// Convenience constructor using default columns and no overrides.
    pub fn new(input: impl Into<PathBuf>, encoding: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            output: None,
            encoding: encoding.into(),
            tables_path: None,
            columns: ColumnNames::default(),
            dry_run: false,
        }
    }

    /// Output path, defaulting to `<input stem>_轉檔.csv` beside the input.
    pub fn resolved_output(&self) -> PathBuf {
        match &self.output {
            Some(path) => path.clone(),
            None => default_output_path(&self.input),
        }
    }
}

/// Counts reported after a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionSummary {
    pub rows_read: usize,
    pub events_written: usize,
    pub rows_merged: usize,
    pub exams_continued: usize,
    /// `None` for dry runs, which write to stdout.
    pub output: Option<PathBuf>,
}

pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "calendar".to_string());
    input.with_file_name(format!("{stem}{DEFAULT_OUTPUT_SUFFIX}.csv"))
}

struct StageTimer {
    program_start: Instant,
    stage_start: Instant,
}

impl StageTimer {
    fn new() -> Self {
        let now = Instant::now();
        Self {
            program_start: now,
            stage_start: now,
        }
    }

    fn begin(&mut self, name: &str) {
        self.stage_start = Instant::now();
        info!(
            stage = name,
            elapsed_ms = %format_ms(self.program_start.elapsed()),
            "BEGIN"
        );
    }

    fn end(&self, name: &str) {
        info!(
            stage = name,
            elapsed_ms = %format_ms(self.program_start.elapsed()),
            stage_ms = %format_ms(self.stage_start.elapsed()),
            "END"
        );
    }
}

fn format_ms(d: std::time::Duration) -> String {
    format!("{:.3}", d.as_secs_f64() * 1_000.0)
}

/// Resolve the lookup tables for a run: an explicit tables file wins over `configured`.
pub fn resolve_tables(
    config: &ConversionConfig,
    configured: &LookupTables,
) -> Result<LookupTables, ConvertError> {
    match &config.tables_path {
        Some(path) => {
            let tables = LookupTables::load(path)?;
            info!(path = %path.display(), "Loaded lookup tables");
            Ok(tables)
        }
        None => Ok(configured.clone()),
    }
}

/// Read, classify, merge and write one calendar export.
pub fn run_conversion(
    config: &ConversionConfig,
    tables: &LookupTables,
) -> Result<ConversionSummary, ConvertError> {
    let mut timer = StageTimer::new();

    timer.begin("Read source table");
    let rows = read_raw_events(&config.input, &config.encoding, &config.columns)?;
    info!(path = %config.input.display(), rows = rows.len(), "Read source rows");
    timer.end("Read source table");

    timer.begin("Classify and merge");
    let mut merger = Merger::new(tables);
    let mut exams_continued = 0;
    for row in &rows {
        if merger.push(row) == RowOutcome::ExamContinued {
            exams_continued += 1;
        }
    }
    let rows_merged = merger.merged_rows();
    let events = merger.finish();
    info!(events = events.len(), rows_merged, "Merged rows into events");
    timer.end("Classify and merge");

    timer.begin("Write output table");
    let output = if config.dry_run {
        write_events(io::stdout().lock(), &events, Path::new("<stdout>"))?;
        None
    } else {
        let path = config.resolved_output();
        write_output_file(&path, &events)?;
        info!(path = %path.display(), "Wrote output table");
        Some(path)
    };
    timer.end("Write output table");

    Ok(ConversionSummary {
        rows_read: rows.len(),
        events_written: events.len(),
        rows_merged,
        exams_continued,
        output,
    })
}
