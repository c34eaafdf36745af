//! Persistence seams. Each domain module declares repository traits over the
//! generic create/read/update/delete surface it needs; this module carries
//! the shared error enumeration and the in-memory reference implementation
//! used by the demo server and the test suites.

mod memory;

pub use memory::{
    MemoryChallenges, MemoryCommitteeships, MemoryCoursesurveys, MemoryEvents, MemoryKlasses,
    MemoryPeople, MemorySurveyRecords,
};

/// Error enumeration for repository failures. Uniqueness-constraint
/// violations surface as `Conflict` and are mapped back into validation
/// errors by the calling layer.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
