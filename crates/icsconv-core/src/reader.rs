//! Loads the source calendar export into [`RawEvent`]s, preserving row order.

use std::fs;
use std::path::Path;

use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ReadError;
use crate::event::{RawEvent, parse_all_day};

/// Header names of the source export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnNames {
    #[serde(default = "ColumnNames::default_subject")]
    pub subject: String,
    #[serde(default = "ColumnNames::default_start_date")]
    pub start_date: String,
    #[serde(default = "ColumnNames::default_start_time")]
    pub start_time: String,
    #[serde(default = "ColumnNames::default_end_date")]
    pub end_date: String,
    #[serde(default = "ColumnNames::default_end_time")]
    pub end_time: String,
    #[serde(default = "ColumnNames::default_all_day")]
    pub all_day: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            subject: Self::default_subject(),
            start_date: Self::default_start_date(),
            start_time: Self::default_start_time(),
            end_date: Self::default_end_date(),
            end_time: Self::default_end_time(),
            all_day: Self::default_all_day(),
        }
    }
}

impl ColumnNames {
    fn default_subject() -> String {
        "主旨".to_string()
    }

    fn default_start_date() -> String {
        "開始日期".to_string()
    }

    fn default_start_time() -> String {
        "開始時間".to_string()
    }

    fn default_end_date() -> String {
        "結束日期".to_string()
    }

    fn default_end_time() -> String {
        "結束時間".to_string()
    }

    fn default_all_day() -> String {
        "全天".to_string()
    }

    fn in_order(&self) -> [&str; 6] {
        [
            self.subject.as_str(),
            self.start_date.as_str(),
            self.start_time.as_str(),
            self.end_date.as_str(),
            self.end_time.as_str(),
            self.all_day.as_str(),
        ]
    }
}

/// Resolve a WHATWG encoding label such as `big5`, `cp950` aliases or `utf-8`.
pub fn resolve_encoding(label: &str) -> Result<&'static Encoding, ReadError> {
    Encoding::for_label(label.trim().as_bytes()).ok_or_else(|| ReadError::UnknownEncoding {
        label: label.to_string(),
    })
}

/// Read the source table at `path`, decoding it with `encoding_label`.
///
/// A byte order mark in the file takes precedence over the label.
pub fn read_raw_events(
    path: &Path,
    encoding_label: &str,
    columns: &ColumnNames,
) -> Result<Vec<RawEvent>, ReadError> {
    let encoding = resolve_encoding(encoding_label)?;
    let bytes = fs::read(path).map_err(|source| ReadError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let (text, used, had_errors) = encoding.decode(&bytes);
    if had_errors {
        warn!(
            path = %path.display(),
            encoding = used.name(),
            "Input contained byte sequences invalid for the encoding; replaced with U+FFFD"
        );
    }
    debug!(path = %path.display(), encoding = used.name(), bytes = bytes.len(), "Decoded input");

    parse_raw_events(&text, path, columns)
}

/// Parse already-decoded table text. `path` is only used for error messages.
pub fn parse_raw_events(
    text: &str,
    path: &Path,
    columns: &ColumnNames,
) -> Result<Vec<RawEvent>, ReadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let malformed = |source| ReadError::Malformed {
        path: path.to_path_buf(),
        source,
    };

    let headers = reader.headers().map_err(malformed)?.clone();
    let mut indices = [0usize; 6];
    for (slot, name) in indices.iter_mut().zip(columns.in_order()) {
        *slot = headers
            .iter()
            .position(|header| header.trim() == name)
            .ok_or_else(|| ReadError::MissingColumn {
                path: path.to_path_buf(),
                column: name.to_string(),
            })?;
    }
    let [subject, start_date, start_time, end_date, end_time, all_day] = indices;

    let mut events = Vec::new();
    for record in reader.records() {
        let record = record.map_err(malformed)?;
        let field = |idx: usize| record.get(idx).unwrap_or_default().to_string();
        events.push(RawEvent {
            subject: field(subject),
            start_date: field(start_date),
            start_time: field(start_time),
            end_date: field(end_date),
            end_time: field(end_time),
            all_day: parse_all_day(record.get(all_day).unwrap_or_default()),
        });
    }

    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "主旨,開始日期,開始時間,結束日期,結束時間,全天\n";

    #[test]
    fn test_parse_preserves_row_order() {
        let text = format!(
            "{HEADER}PBL-Case-1,2024/2/26,08:10:00,2024/2/26,09:00:00,False\n\
             一對一訪談,2024/2/26,09:10:00,2024/2/26,10:00:00,False\n"
        );
        let events = parse_raw_events(&text, Path::new("in.csv"), &ColumnNames::default())
            .expect("parse");
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].subject, "PBL-Case-1");
        assert_eq!(events[0].start_time, "08:10:00");
        assert_eq!(events[1].subject, "一對一訪談");
        assert_eq!(events[1].end_time, "10:00:00");
        assert!(!events[1].all_day);
    }

    #[test]
    fn test_parse_quoted_subject_with_commas() {
        let text = format!(
            "{HEADER}\"[Neurology]:L1, Stroke,Dr. Wang\",2024/3/1,08:10:00,2024/3/1,09:00:00,True\n"
        );
        let events = parse_raw_events(&text, Path::new("in.csv"), &ColumnNames::default())
            .expect("parse");
        assert_eq!(events[0].subject, "[Neurology]:L1, Stroke,Dr. Wang");
        assert!(events[0].all_day);
    }

    #[test]
    fn test_parse_ignores_extra_columns_and_order() {
        let text = "全天,備註,結束時間,結束日期,開始時間,開始日期,主旨\n\
                    False,x,10:00,2024/1/2,09:00,2024/1/2,Meeting\n";
        let events = parse_raw_events(text, Path::new("in.csv"), &ColumnNames::default())
            .expect("parse");
        assert_eq!(events[0].subject, "Meeting");
        assert_eq!(events[0].start_time, "09:00");
        assert_eq!(events[0].end_date, "2024/1/2");
    }

    #[test]
    fn test_missing_column_names_path_and_column() {
        let text = "主旨,開始日期,開始時間,結束日期,結束時間\nA,1,2,3,4\n";
        let err = parse_raw_events(text, Path::new("term.csv"), &ColumnNames::default())
            .unwrap_err();
        match &err {
            ReadError::MissingColumn { column, .. } => assert_eq!(column, "全天"),
            other => panic!("unexpected error: {other:?}"),
        }
        let message = err.to_string();
        assert!(message.contains("term.csv"));
        assert!(message.contains("全天"));
    }

    #[test]
    fn test_short_rows_yield_empty_fields() {
        let text = format!("{HEADER}Only subject\n");
        let events = parse_raw_events(&text, Path::new("in.csv"), &ColumnNames::default())
            .expect("parse");
        assert_eq!(events[0].subject, "Only subject");
        assert_eq!(events[0].end_time, "");
        assert!(!events[0].all_day);
    }

    #[test]
    fn test_unknown_encoding_label() {
        let err = resolve_encoding("klingon-8").unwrap_err();
        assert!(matches!(err, ReadError::UnknownEncoding { .. }));
    }

    #[test]
    fn test_read_big5_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("big5.csv");
        let text = format!("{HEADER}基礎臨床技能訓練課程,2024/3/1,08:00,2024/3/1,12:00,False\n");
        let (bytes, _, had_errors) = encoding_rs::BIG5.encode(&text);
        assert!(!had_errors);
        fs::write(&path, &bytes).expect("write");

        let events = read_raw_events(&path, "big5", &ColumnNames::default()).expect("read");
        assert_eq!(events[0].subject, "基礎臨床技能訓練課程");
    }

    #[test]
    fn test_read_missing_file() {
        let err = read_raw_events(
            Path::new("/nonexistent/calendar.csv"),
            "utf-8",
            &ColumnNames::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ReadError::Open { .. }));
        assert!(err.to_string().contains("/nonexistent/calendar.csv"));
    }
}
