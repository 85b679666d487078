//! Classification of free-text subjects into the fixed set of event shapes.

use std::sync::LazyLock;

use regex::Regex;

/// Character marking a topic as an examination.
pub const EXAM_MARKER: char = '考';
/// Lecturer value meaning "no lecturer".
pub const NO_LECTURER: &str = "-";
/// Subject used for one-on-one PBL interviews.
pub const ONE_ON_ONE_INTERVIEW: &str = "一對一訪談";
/// Subject used for the Basic Clinical Skills training block.
pub const BCS_COURSE: &str = "基礎臨床技能訓練課程";

// `[<course>]:<lec code>, <topic>,<lecturer>`
static STANDARD_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[([^:]+)\]:([^,]+), (.+),([^,]+)").expect("standard subject pattern")
});
// `PBL-<topic>-<round>`
static PBL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^PBL-([^-]+)-([^-]+)").expect("PBL subject pattern"));
// `[選修]<course>`, Traditional or Simplified marker
static ELECTIVE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[(?:選修|选修)\]([^\]]+)").expect("elective subject pattern")
});

/// Structured reading of one subject cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifiedSubject {
    StandardCourse {
        course: String,
        lec_code: String,
        topic: String,
        /// `None` when the source uses the `-` placeholder.
        lecturer: Option<String>,
    },
    Exam {
        course: String,
        lec_code: String,
        exam_name: String,
        owner: String,
    },
    Pbl {
        topic_name: String,
        round: String,
    },
    OneOnOneInterview,
    OptionalCourse {
        course_name: String,
    },
    Bcs,
    Other {
        raw_text: String,
    },
}

impl ClassifiedSubject {
    /// Key carried forward so following rows can merge into this event.
    ///
    /// `None` leaves whatever key was carried before untouched.
    pub fn merge_key(&self, raw_subject: &str) -> Option<String> {
        match self {
            ClassifiedSubject::Exam { exam_name, .. } => Some(exam_name.clone()),
            ClassifiedSubject::Pbl { .. }
            | ClassifiedSubject::Bcs
            | ClassifiedSubject::Other { .. } => Some(raw_subject.to_string()),
            ClassifiedSubject::StandardCourse { .. }
            | ClassifiedSubject::OneOnOneInterview
            | ClassifiedSubject::OptionalCourse { .. } => None,
        }
    }
}

/// True when `subject` starts with the `[course]:code, topic,lecturer` shape.
pub fn matches_standard(subject: &str) -> bool {
    STANDARD_PATTERN.is_match(subject)
}

/// Classify a subject. First matching shape wins; anything unmatched is `Other`.
pub fn classify_subject(subject: &str) -> ClassifiedSubject {
    if let Some(caps) = STANDARD_PATTERN.captures(subject) {
        let course = caps[1].to_string();
        let lec_code = caps[2].to_string();
        let topic = caps[3].to_string();
        let lecturer = caps[4].to_string();

        // Exam marker takes precedence over the `-` lecturer placeholder.
        if topic.contains(EXAM_MARKER) {
            return ClassifiedSubject::Exam {
                course,
                lec_code,
                exam_name: topic,
                owner: lecturer,
            };
        }
        let lecturer = (lecturer != NO_LECTURER).then_some(lecturer);
        return ClassifiedSubject::StandardCourse {
            course,
            lec_code,
            topic,
            lecturer,
        };
    }

    if let Some(caps) = PBL_PATTERN.captures(subject) {
        return ClassifiedSubject::Pbl {
            topic_name: caps[1].to_string(),
            round: caps[2].to_string(),
        };
    }

    if subject == ONE_ON_ONE_INTERVIEW {
        return ClassifiedSubject::OneOnOneInterview;
    }

    if let Some(caps) = ELECTIVE_PATTERN.captures(subject) {
        return ClassifiedSubject::OptionalCourse {
            course_name: caps[1].to_string(),
        };
    }

    if subject == BCS_COURSE {
        return ClassifiedSubject::Bcs;
    }

    ClassifiedSubject::Other {
        raw_text: subject.to_string(),
    }
}
