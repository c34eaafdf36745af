//! Committee memberships, people, and candidate challenges.

pub mod domain;
pub mod repository;
pub mod router;
pub mod validate;

pub use domain::{
    Challenge, ChallengeId, ChallengeStatus, Committee, Committeeship, Group, GroupId, Person,
    PersonId, Position,
};
pub use repository::{ChallengeRepository, CommitteeshipRepository, PersonDirectory};
pub use router::{members_router, MembersState};
pub use validate::CommitteeshipDraft;
