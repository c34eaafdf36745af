use serde::{Deserialize, Serialize};

use crate::semester::Semester;

/// Identifier wrapper for people.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PersonId(pub u64);

/// Identifier wrapper for permission groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupId(pub u64);

/// A named permission group used to restrict event visibility and RSVPs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
}

/// A unique individual. Group memberships drive the event permission checks;
/// the SMS number, when present, is the notification contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub name: String,
    pub sms_number: Option<String>,
    pub groups: Vec<GroupId>,
}

impl Person {
    pub fn in_group(&self, group: GroupId) -> bool {
        self.groups.contains(&group)
    }
}

/// The closed set of committee codes a committeeship may reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Committee {
    Pres,
    Vp,
    Rsec,
    Treas,
    Csec,
    Deprel,
    Act,
    Alumrel,
    Bridge,
    Compserv,
    Indrel,
    Serv,
    Studrel,
    Tutoring,
    Pub,
    Examfiles,
    Ejc,
}

impl Committee {
    pub const ALL: [Self; 17] = [
        Self::Pres,
        Self::Vp,
        Self::Rsec,
        Self::Treas,
        Self::Csec,
        Self::Deprel,
        Self::Act,
        Self::Alumrel,
        Self::Bridge,
        Self::Compserv,
        Self::Indrel,
        Self::Serv,
        Self::Studrel,
        Self::Tutoring,
        Self::Pub,
        Self::Examfiles,
        Self::Ejc,
    ];

    pub const fn code(self) -> &'static str {
        match self {
            Self::Pres => "pres",
            Self::Vp => "vp",
            Self::Rsec => "rsec",
            Self::Treas => "treas",
            Self::Csec => "csec",
            Self::Deprel => "deprel",
            Self::Act => "act",
            Self::Alumrel => "alumrel",
            Self::Bridge => "bridge",
            Self::Compserv => "compserv",
            Self::Indrel => "indrel",
            Self::Serv => "serv",
            Self::Studrel => "studrel",
            Self::Tutoring => "tutoring",
            Self::Pub => "pub",
            Self::Examfiles => "examfiles",
            Self::Ejc => "ejc",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|committee| committee.code() == code)
    }

    /// Display-name lookup. The table is partial: `ejc` has no entry, so the
    /// result is absent for it.
    pub const fn display_name(self) -> Option<&'static str> {
        match self {
            Self::Pres => Some("President"),
            Self::Vp => Some("Vice President"),
            Self::Rsec => Some("Recording Secretary"),
            Self::Csec => Some("Corresponding Secretary"),
            Self::Treas => Some("Treasurer"),
            Self::Deprel => Some("Department Relations"),
            Self::Act => Some("Activities"),
            Self::Alumrel => Some("Alumni Relations"),
            Self::Bridge => Some("Bridge"),
            Self::Compserv => Some("Computing Services"),
            Self::Indrel => Some("Industrial Relations"),
            Self::Serv => Some("Service"),
            Self::Studrel => Some("Student Relations"),
            Self::Tutoring => Some("Tutoring"),
            Self::Pub => Some("Publicity"),
            Self::Examfiles => Some("Exam Files"),
            Self::Ejc => None,
        }
    }

    /// The five executive committees render their display name without a
    /// position suffix.
    pub const fn is_executive(self) -> bool {
        matches!(
            self,
            Self::Pres | Self::Vp | Self::Rsec | Self::Treas | Self::Csec
        )
    }
}

/// The position a person holds within a committee for one semester.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    Officer,
    CommitteeMember,
    Candidate,
}

impl Position {
    pub const ALL: [Self; 3] = [Self::Officer, Self::CommitteeMember, Self::Candidate];

    pub const fn code(self) -> &'static str {
        match self {
            Self::Officer => "officer",
            Self::CommitteeMember => "cmember",
            Self::Candidate => "candidate",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|position| position.code() == code)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Officer => "Officer",
            Self::CommitteeMember => "Committee Member",
            Self::Candidate => "Candidate",
        }
    }
}

/// A person's role record within one committee for one semester. At most one
/// exists per (person, committee, semester) triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Committeeship {
    pub person: PersonId,
    pub committee: Committee,
    pub semester: Semester,
    pub position: Position,
}

impl Committeeship {
    pub fn nice_semester(&self) -> Option<String> {
        self.semester.nice_name()
    }

    /// Executive committees read as the committee name alone; every other
    /// committee appends the position label. Absent when the committee has no
    /// display name.
    pub fn nice_position(&self) -> Option<String> {
        let committee = self.committee.display_name()?;
        if self.committee.is_executive() {
            Some(committee.to_string())
        } else {
            Some(format!("{} {}", committee, self.position.label()))
        }
    }
}

/// Outcome of a candidate challenge. The pending state is explicit rather
/// than an unset boolean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeStatus {
    Pending,
    Confirmed,
    Rejected,
}

impl ChallengeStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Confirmed => "Confirmed",
            Self::Rejected => "Rejected",
        }
    }
}

/// Identifier wrapper for challenges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChallengeId(pub u64);

/// A task issued to a candidate by an officer during the evaluation track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge {
    pub id: ChallengeId,
    pub name: String,
    pub description: String,
    pub status: ChallengeStatus,
    pub candidate: PersonId,
    pub officer: PersonId,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn committeeship(committee: Committee, position: Position) -> Committeeship {
        Committeeship {
            person: PersonId(7),
            committee,
            semester: "20103".parse().expect("valid semester"),
            position,
        }
    }

    #[test]
    fn committee_codes_round_trip() {
        for committee in Committee::ALL {
            assert_eq!(Committee::from_code(committee.code()), Some(committee));
        }
        assert_eq!(Committee::from_code("pubrel"), None);
    }

    #[test]
    fn position_codes_round_trip() {
        for position in Position::ALL {
            assert_eq!(Position::from_code(position.code()), Some(position));
        }
        assert_eq!(Position::from_code("hoser"), None);
    }

    #[test]
    fn display_name_table_is_partial() {
        assert_eq!(Committee::Compserv.display_name(), Some("Computing Services"));
        assert_eq!(Committee::Ejc.display_name(), None);
    }

    #[test]
    fn executives_render_without_position() {
        let pres = committeeship(Committee::Pres, Position::Officer);
        assert_eq!(pres.nice_position().as_deref(), Some("President"));
    }

    #[test]
    fn non_executives_append_the_position_label() {
        let record = committeeship(Committee::Compserv, Position::CommitteeMember);
        assert_eq!(
            record.nice_position().as_deref(),
            Some("Computing Services Committee Member")
        );

        let candidate = committeeship(Committee::Tutoring, Position::Candidate);
        assert_eq!(
            candidate.nice_position().as_deref(),
            Some("Tutoring Candidate")
        );
    }

    #[test]
    fn nameless_committee_has_no_position_rendering() {
        let record = committeeship(Committee::Ejc, Position::CommitteeMember);
        assert_eq!(record.nice_position(), None);
    }

    #[test]
    fn challenge_status_labels() {
        assert_eq!(ChallengeStatus::Pending.label(), "Pending");
        assert_eq!(ChallengeStatus::Confirmed.label(), "Confirmed");
        assert_eq!(ChallengeStatus::Rejected.label(), "Rejected");
    }
}
