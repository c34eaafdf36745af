use super::domain::{Coursesurvey, CoursesurveyId, Klass, KlassId, SurveyRecord};
use crate::semester::Semester;
use crate::store::RepositoryError;

/// Lookup surface for course offerings.
pub trait KlassCatalog: Send + Sync {
    fn insert(&self, klass: Klass) -> Result<(), RepositoryError>;
    fn for_semester(&self, semester: Semester) -> Result<Vec<Klass>, RepositoryError>;
}

/// Storage abstraction for coursesurvey state. Inserts enforce the
/// one-survey-per-Klass constraint.
pub trait CoursesurveyRepository: Send + Sync {
    fn insert(&self, survey: Coursesurvey) -> Result<(), RepositoryError>;
    fn update(&self, survey: Coursesurvey) -> Result<(), RepositoryError>;
    fn delete(&self, id: CoursesurveyId) -> Result<(), RepositoryError>;
    fn fetch(&self, id: CoursesurveyId) -> Result<Option<Coursesurvey>, RepositoryError>;
    fn for_klass(&self, klass: KlassId) -> Result<Option<Coursesurvey>, RepositoryError>;
    fn all(&self) -> Result<Vec<Coursesurvey>, RepositoryError>;
}

/// Storage abstraction for imported survey result rows.
pub trait SurveyRecordRepository: Send + Sync {
    fn insert(&self, record: SurveyRecord) -> Result<(), RepositoryError>;
    fn all(&self) -> Result<Vec<SurveyRecord>, RepositoryError>;
    fn count(&self) -> Result<usize, RepositoryError>;
}
