//! Converts term calendar exports into calendar-import tables.
//!
//! Pipeline: [`reader`] loads source rows, [`merge`] classifies each subject
//! and folds consecutive rows of one event together, [`writer`] emits the
//! import table.

pub mod classify;
pub mod config;
pub mod error;
pub mod event;
pub mod format;
pub mod logging;
pub mod lookup;
pub mod merge;
pub mod reader;
pub mod runtime;
pub mod writer;

pub use classify::{ClassifiedSubject, classify_subject};
pub use config::{
    ConfigLoadResult, ConfigSource, FileConfig, RuntimeOverrides, RuntimePreferences,
    apply_runtime_overrides, config_directory, config_path, load_config, save_config,
};
pub use error::{ConfigError, ConvertError, ReadError, WriteError};
pub use event::{OutputEvent, RawEvent};
pub use lookup::{LookupTables, TableKind};
pub use merge::{Merger, RowOutcome, convert};
pub use reader::{ColumnNames, read_raw_events};
pub use runtime::{ConversionConfig, ConversionSummary, resolve_tables, run_conversion};
pub use writer::{write_events, write_output_file};
