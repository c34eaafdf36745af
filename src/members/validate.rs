use serde::Deserialize;

use super::domain::{Committee, Committeeship, PersonId, Position};
use crate::semester::Semester;
use crate::validate::FieldViolation;

/// An inbound committeeship as it arrives from a form: untyped codes that
/// have not yet been checked against the closed enumerations.
#[derive(Debug, Clone, Deserialize)]
pub struct CommitteeshipDraft {
    pub person: PersonId,
    pub committee: String,
    pub semester: String,
    pub title: String,
}

impl CommitteeshipDraft {
    /// Check the draft against the closed code sets and the uniqueness of the
    /// (person, committee, semester) triple among `existing` records. Returns
    /// the typed record when no violation is found.
    pub fn validate(&self, existing: &[Committeeship]) -> Result<Committeeship, Vec<FieldViolation>> {
        let mut violations = Vec::new();

        let committee = Committee::from_code(&self.committee);
        if committee.is_none() {
            violations.push(FieldViolation::new("committee", "Committee not recognized."));
        }

        let semester = self.semester.parse::<Semester>().ok();
        if semester.is_none() {
            violations.push(FieldViolation::new("semester", "Not a valid semester."));
        }

        let position = Position::from_code(&self.title);
        if position.is_none() {
            violations.push(FieldViolation::new("title", "Not a valid title."));
        }

        if let (Some(committee), Some(semester)) = (committee, semester) {
            let duplicate = existing.iter().any(|record| {
                record.person == self.person
                    && record.committee == committee
                    && record.semester == semester
            });
            if duplicate {
                violations.push(FieldViolation::new("committee", "has already been taken"));
            }
        }

        match (committee, semester, position) {
            (Some(committee), Some(semester), Some(position)) if violations.is_empty() => {
                Ok(Committeeship {
                    person: self.person,
                    committee,
                    semester,
                    position,
                })
            }
            _ => Err(violations),
        }
    }
}
