use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::semester::Semester;

/// Identifier wrapper for course offerings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KlassId(pub u64);

/// A specific offering of a course in a given semester.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Klass {
    pub id: KlassId,
    pub course: String,
    pub section: u32,
    pub semester: Semester,
}

impl Klass {
    pub fn display(&self) -> String {
        format!("{}-{:02}", self.course, self.section)
    }
}

/// Identifier wrapper for coursesurvey records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CoursesurveyId(pub u64);

/// Marks a Klass as subject to end-of-semester survey collection. At most
/// one exists per Klass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coursesurvey {
    pub id: CoursesurveyId,
    pub klass: KlassId,
    pub published: bool,
    pub deadline: Option<NaiveDate>,
}

/// The fields a coursesurvey update may change. Updates arrive as this
/// explicit struct rather than a keyed parameter blob, so nothing outside
/// these fields can be touched.
#[derive(Debug, Clone, Deserialize)]
pub struct CoursesurveyUpdate {
    pub id: CoursesurveyId,
    #[serde(default)]
    pub published: Option<bool>,
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
}

/// Whose ratings a survey row describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurveyRole {
    Instructor,
    TeachingAssistant,
}

impl SurveyRole {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Instructor => "Instructor",
            Self::TeachingAssistant => "Teaching Assistant",
        }
    }
}

/// One imported survey result row: a rated person on a course offering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyRecord {
    pub semester: Semester,
    pub course: String,
    pub section: u32,
    pub instructor: String,
    pub role: SurveyRole,
    pub responses: u32,
    pub rating: f32,
}
