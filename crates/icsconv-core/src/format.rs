//! Renders classified subjects into the subject/location/description strings
//! of the import table.

use crate::classify::{ClassifiedSubject, NO_LECTURER, ONE_ON_ONE_INTERVIEW};
use crate::lookup::{
    BCS_LOCATION, EXAM_LOCATION, LECTURE_LOCATION, LookupTables, PBL_LOCATION, UNKNOWN_LOCATION,
};

/// Display strings for one output event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedSubject {
    pub subject: String,
    pub location: String,
    pub description: String,
}

pub fn render(classified: &ClassifiedSubject, tables: &LookupTables) -> RenderedSubject {
    match classified {
        ClassifiedSubject::StandardCourse {
            course,
            lec_code,
            topic,
            lecturer: None,
        } => RenderedSubject {
            subject: format!("[{}] {}", tables.abbreviate(course), topic),
            location: tables.location(UNKNOWN_LOCATION).to_string(),
            description: course_description(course, lec_code, topic, NO_LECTURER),
        },
        ClassifiedSubject::StandardCourse {
            course,
            lec_code,
            topic,
            lecturer: Some(lecturer),
        } => RenderedSubject {
            subject: format!("[{}] {} ({})", tables.abbreviate(course), topic, lecturer),
            location: tables.location(LECTURE_LOCATION).to_string(),
            description: course_description(course, lec_code, topic, lecturer),
        },
        ClassifiedSubject::Exam {
            course,
            lec_code,
            exam_name,
            owner,
        } => RenderedSubject {
            subject: format!("[!考試!] {exam_name}"),
            location: tables.location(EXAM_LOCATION).to_string(),
            description: format!(
                "科目：{course}\n課程編號：{lec_code}\n名稱：{exam_name}\n負責人：{owner}\n"
            ),
        },
        ClassifiedSubject::Pbl { topic_name, round } => RenderedSubject {
            subject: format!("[PBL] {topic_name} - {round}"),
            location: tables.location(PBL_LOCATION).to_string(),
            description: format!("教案編號：{topic_name}\n回合：{round}\n"),
        },
        ClassifiedSubject::OneOnOneInterview => RenderedSubject {
            subject: format!("[PBL] {ONE_ON_ONE_INTERVIEW}"),
            location: tables.location(PBL_LOCATION).to_string(),
            description: String::new(),
        },
        ClassifiedSubject::OptionalCourse { course_name } => RenderedSubject {
            subject: format!("[{course_name}] (選修)"),
            location: tables.location(course_name).to_string(),
            description: String::new(),
        },
        ClassifiedSubject::Bcs => RenderedSubject {
            subject: "[BCS]".to_string(),
            location: tables.location(BCS_LOCATION).to_string(),
            description: String::new(),
        },
        ClassifiedSubject::Other { raw_text } => RenderedSubject {
            subject: raw_text.clone(),
            ..RenderedSubject::default()
        },
    }
}

fn course_description(course: &str, lec_code: &str, topic: &str, lecturer: &str) -> String {
    format!("科目：{course}\n課程編號：{lec_code}\n主題：{topic}\n講師：{lecturer}\n")
}
