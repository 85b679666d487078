//! Row-by-row merge of consecutive source rows into output events.
//!
//! A row either extends the most recently emitted event or starts a new one.
//! The decision depends on a key carried from earlier rows, so input order is
//! part of the contract.

use tracing::debug;

use crate::classify::{classify_subject, matches_standard};
use crate::event::{OutputEvent, RawEvent};
use crate::format::render;
use crate::lookup::LookupTables;

/// What happened to a single source row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOutcome {
    /// Identical subject to the carried key; the last event was extended.
    Merged,
    /// Same exam under another course or lecture code; the last event was extended.
    ExamContinued,
    /// A new output event was appended.
    Emitted,
}

/// Carries merge state across the rows of one conversion run.
#[derive(Debug)]
pub struct Merger<'a> {
    tables: &'a LookupTables,
    last_subject_key: Option<String>,
    events: Vec<OutputEvent>,
    merged_rows: usize,
}

impl<'a> Merger<'a> {
    pub fn new(tables: &'a LookupTables) -> Self {
        Self {
            tables,
            last_subject_key: None,
            events: Vec::new(),
            merged_rows: 0,
        }
    }

    pub fn push(&mut self, raw: &RawEvent) -> RowOutcome {
        if let (Some(key), Some(last)) = (self.last_subject_key.as_deref(), self.events.last_mut())
        {
            if key == raw.subject {
                last.extend_to(raw);
                self.merged_rows += 1;
                debug!(subject = %raw.subject, end_date = %raw.end_date, end_time = %raw.end_time, "Merged row");
                return RowOutcome::Merged;
            }
            // Heuristic: a short exam name can also match an unrelated longer one.
            if !key.is_empty() && raw.subject.contains(key) && matches_standard(&raw.subject) {
                last.extend_to(raw);
                self.merged_rows += 1;
                debug!(subject = %raw.subject, key, "Continued exam across lecture codes");
                return RowOutcome::ExamContinued;
            }
        }

        let classified = classify_subject(&raw.subject);
        if let Some(key) = classified.merge_key(&raw.subject) {
            self.last_subject_key = Some(key);
        }
        let rendered = render(&classified, self.tables);
        debug!(subject = %raw.subject, rendered = %rendered.subject, "Emitted event");

        self.events.push(OutputEvent {
            subject: rendered.subject,
            start_date: raw.start_date.clone(),
            start_time: raw.start_time.clone(),
            end_date: raw.end_date.clone(),
            end_time: raw.end_time.clone(),
            all_day: raw.all_day,
            description: rendered.description,
            location: rendered.location,
        });
        RowOutcome::Emitted
    }

    pub fn last_subject_key(&self) -> Option<&str> {
        self.last_subject_key.as_deref()
    }

    pub fn events(&self) -> &[OutputEvent] {
        &self.events
    }

    pub fn merged_rows(&self) -> usize {
        self.merged_rows
    }

    pub fn finish(self) -> Vec<OutputEvent> {
        self.events
    }
}

/// Convert a full sequence of source rows.
pub fn convert(rows: &[RawEvent], tables: &LookupTables) -> Vec<OutputEvent> {
    let mut merger = Merger::new(tables);
    for row in rows {
        merger.push(row);
    }
    merger.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(subject: &str, start: &str, end: &str) -> RawEvent {
        RawEvent {
            subject: subject.to_string(),
            start_date: "2024/2/26".to_string(),
            start_time: start.to_string(),
            end_date: "2024/2/26".to_string(),
            end_time: end.to_string(),
            all_day: false,
        }
    }

    #[test]
    fn test_identical_pbl_rows_merge() {
        let tables = LookupTables::builtin();
        let mut merger = Merger::new(&tables);
        assert_eq!(merger.push(&row("PBL-Diabetes Case-2", "08:10", "09:00")), RowOutcome::Emitted);
        assert_eq!(merger.last_subject_key(), Some("PBL-Diabetes Case-2"));
        assert_eq!(merger.push(&row("PBL-Diabetes Case-2", "09:10", "10:00")), RowOutcome::Merged);

        let events = merger.finish();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].subject, "[PBL] Diabetes Case - 2");
        assert_eq!(events[0].start_time, "08:10");
        assert_eq!(events[0].end_time, "10:00");
    }

    #[test]
    fn test_merge_takes_end_date_of_later_row() {
        let tables = LookupTables::builtin();
        let first = row("Winter break", "00:00", "23:59");
        let mut second = row("Winter break", "00:00", "12:00");
        second.end_date = "2024/2/28".to_string();

        let events = convert(&[first, second], &tables);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].end_date, "2024/2/28");
        assert_eq!(events[0].end_time, "12:00");
        assert_eq!(events[0].start_date, "2024/2/26");
    }

    #[test]
    fn test_exam_continues_across_lecture_codes() {
        let tables = LookupTables::builtin();
        let mut merger = Merger::new(&tables);
        merger.push(&row("[Course X]:L1, Final 考試,-", "08:10", "09:00"));
        assert_eq!(merger.last_subject_key(), Some("Final 考試"));
        assert_eq!(
            merger.push(&row("[Course Y]:L2, Final 考試,-", "09:10", "10:00")),
            RowOutcome::ExamContinued
        );

        let events = merger.finish();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].subject, "[!考試!] Final 考試");
        assert_eq!(events[0].end_time, "10:00");
    }

    #[test]
    fn test_exam_key_does_not_absorb_non_standard_rows() {
        let tables = LookupTables::builtin();
        let events = convert(
            &[
                row("[Course X]:L1, Final 考試,Dr. Z", "08:10", "09:00"),
                row("Review of Final 考試", "09:10", "10:00"),
            ],
            &tables,
        );
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].subject, "Review of Final 考試");
    }

    #[test]
    fn test_lectures_never_merge() {
        let tables = LookupTables::builtin();
        let lecture = "[Neurology]:NEU-1, Stroke,Dr. Lin";
        let events = convert(
            &[row(lecture, "08:10", "09:00"), row(lecture, "09:10", "10:00")],
            &tables,
        );
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].subject, "[神經] Stroke (Dr. Lin)");
        assert_eq!(events[0].location, "綜二教室");
    }

    #[test]
    fn test_key_survives_rows_that_do_not_set_one() {
        let tables = LookupTables::builtin();
        let mut merger = Merger::new(&tables);
        merger.push(&row("基礎臨床技能訓練課程", "08:00", "10:00"));
        merger.push(&row("[選修]藥理學實驗", "10:10", "12:00"));
        assert_eq!(merger.last_subject_key(), Some("基礎臨床技能訓練課程"));
        assert_eq!(merger.events().len(), 2);
    }

    #[test]
    fn test_other_rows_merge_and_render_verbatim() {
        let tables = LookupTables::builtin();
        let events = convert(
            &[
                row("Hospital orientation", "08:00", "10:00"),
                row("Hospital orientation", "10:00", "12:00"),
                row("一對一訪談", "13:00", "14:00"),
            ],
            &tables,
        );
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].subject, "Hospital orientation");
        assert_eq!(events[0].end_time, "12:00");
        assert!(events[0].location.is_empty());
        assert!(events[0].description.is_empty());
        assert_eq!(events[1].subject, "[PBL] 一對一訪談");
    }

    #[test]
    fn test_output_never_longer_than_input() {
        let tables = LookupTables::builtin();
        let subjects = [
            "PBL-A-1",
            "PBL-A-1",
            "[X]:1, Mid 考,-",
            "[Y]:2, Mid 考,-",
            "[Z]:3, Topic,-",
            "一對一訪談",
            "一對一訪談",
            "[选修]Art",
            "",
            "",
        ];
        let rows: Vec<RawEvent> = subjects.iter().map(|s| row(s, "08:00", "09:00")).collect();
        let events = convert(&rows, &tables);
        assert!(events.len() <= rows.len());
        assert_eq!(events.len(), 7);
    }

    #[test]
    fn test_empty_input() {
        let tables = LookupTables::default();
        assert!(convert(&[], &tables).is_empty());
    }
}
