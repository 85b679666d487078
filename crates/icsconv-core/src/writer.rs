//! Writes output events as a UTF-8 calendar-import table.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::WriteError;
use crate::event::OutputEvent;

/// Column order of the import table.
pub const OUTPUT_COLUMNS: [&str; 8] = [
    "Subject",
    "Start Date",
    "Start Time",
    "End Date",
    "End Time",
    "All Day",
    "Description",
    "Location",
];

/// Serialize `events` to `writer`. `label` names the destination in errors.
pub fn write_events<W: Write>(
    writer: W,
    events: &[OutputEvent],
    label: &Path,
) -> Result<(), WriteError> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    let csv_error = |source| WriteError::Csv {
        path: label.to_path_buf(),
        source,
    };

    // Written explicitly so an empty table still carries its header row.
    csv_writer.write_record(OUTPUT_COLUMNS).map_err(csv_error)?;
    for event in events {
        csv_writer.serialize(event).map_err(csv_error)?;
    }
    csv_writer.flush().map_err(|source| WriteError::Io {
        path: label.to_path_buf(),
        source,
    })
}

/// Create (or truncate) `path` and write `events` to it.
pub fn write_output_file(path: &Path, events: &[OutputEvent]) -> Result<(), WriteError> {
    let file = File::create(path).map_err(|source| WriteError::Create {
        path: path.to_path_buf(),
        source,
    })?;
    write_events(file, events, path)
}
