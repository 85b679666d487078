use serde::Serialize;

/// One row of the source calendar export, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    pub subject: String,
    pub start_date: String,
    pub start_time: String,
    pub end_date: String,
    pub end_time: String,
    pub all_day: bool,
}

/// One row of the calendar-import table.
///
/// Only the end date/time is ever changed after creation, when a later source
/// row merges into this event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputEvent {
    #[serde(rename = "Subject")]
    pub subject: String,
    #[serde(rename = "Start Date")]
    pub start_date: String,
    #[serde(rename = "Start Time")]
    pub start_time: String,
    #[serde(rename = "End Date")]
    pub end_date: String,
    #[serde(rename = "End Time")]
    pub end_time: String,
    #[serde(rename = "All Day", serialize_with = "serialize_all_day")]
    pub all_day: bool,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Location")]
    pub location: String,
}

impl OutputEvent {
    pub(crate) fn extend_to(&mut self, raw: &RawEvent) {
        self.end_date.clone_from(&raw.end_date);
        self.end_time.clone_from(&raw.end_time);
    }
}

fn serialize_all_day<S>(value: &bool, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(if *value { "True" } else { "False" })
}

/// Interpret the source's all-day cell. Anything unrecognised counts as false.
pub fn parse_all_day(value: &str) -> bool {
    let trimmed = value.trim();
    matches!(
        trimmed.to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "y"
    ) || matches!(trimmed, "開啟" | "是")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_day() {
        assert!(parse_all_day("True"));
        assert!(parse_all_day(" TRUE "));
        assert!(parse_all_day("1"));
        assert!(parse_all_day("開啟"));
        assert!(!parse_all_day("False"));
        assert!(!parse_all_day("關閉"));
        assert!(!parse_all_day(""));
    }
}
