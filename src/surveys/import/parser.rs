use serde::Deserialize;
use std::io::Read;

use crate::semester::Semester;

/// A validated survey row before the role (instructor vs. TA) is attached.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SurveyEntry {
    pub(crate) semester: Semester,
    pub(crate) course: String,
    pub(crate) section: u32,
    pub(crate) instructor: String,
    pub(crate) responses: u32,
    pub(crate) rating: f32,
}

/// Per-row parse result. Invalid rows never abort the remaining rows.
#[derive(Debug)]
pub(crate) enum RowOutcome {
    Valid(SurveyEntry),
    Invalid { row: usize, problems: Vec<String> },
}

/// Raw row shape as uploaded. Everything deserializes as a string so field
/// problems surface as our own row-level messages rather than opaque
/// deserializer errors.
#[derive(Debug, Deserialize)]
struct SurveyRow {
    #[serde(rename = "Semester")]
    semester: String,
    #[serde(rename = "Course")]
    course: String,
    #[serde(rename = "Section")]
    section: String,
    #[serde(rename = "Instructor")]
    instructor: String,
    #[serde(rename = "Responses")]
    responses: String,
    #[serde(rename = "Rating")]
    rating: String,
}

const RATING_SCALE_MAX: f32 = 7.0;

pub(crate) fn parse_rows<R: Read>(reader: R) -> Vec<RowOutcome> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut outcomes = Vec::new();
    for (index, record) in csv_reader.deserialize::<SurveyRow>().enumerate() {
        let row = index + 1;
        match record {
            Ok(raw) => outcomes.push(validate_row(row, raw)),
            Err(err) => outcomes.push(RowOutcome::Invalid {
                row,
                problems: vec![row_shape_problem(&err)],
            }),
        }
    }

    outcomes
}

fn validate_row(row: usize, raw: SurveyRow) -> RowOutcome {
    let mut problems = Vec::new();

    let semester = raw.semester.parse::<Semester>().ok();
    if semester.is_none() {
        problems.push(format!("'{}' is not a valid semester", raw.semester));
    }

    if raw.course.is_empty() {
        problems.push("course is blank".to_string());
    }
    if raw.instructor.is_empty() {
        problems.push("instructor is blank".to_string());
    }

    let section = raw.section.parse::<u32>().ok();
    if section.is_none() {
        problems.push(format!("'{}' is not a valid section", raw.section));
    }

    let responses = raw.responses.parse::<u32>().ok();
    match responses {
        None => problems.push(format!("'{}' is not a valid response count", raw.responses)),
        Some(0) => problems.push("response count is zero".to_string()),
        Some(_) => {}
    }

    let rating = raw.rating.parse::<f32>().ok();
    match rating {
        None => problems.push(format!("'{}' is not a valid rating", raw.rating)),
        Some(value) if !(0.0..=RATING_SCALE_MAX).contains(&value) => {
            problems.push(format!("rating {value} is outside the 0-{RATING_SCALE_MAX} scale"))
        }
        Some(_) => {}
    }

    match (semester, section, responses, rating) {
        (Some(semester), Some(section), Some(responses), Some(rating))
            if problems.is_empty() =>
        {
            RowOutcome::Valid(SurveyEntry {
                semester,
                course: raw.course,
                section,
                instructor: raw.instructor,
                responses,
                rating,
            })
        }
        _ => RowOutcome::Invalid { row, problems },
    }
}

fn row_shape_problem(err: &csv::Error) -> String {
    format!("row could not be read: {err}")
}
