//! Course-survey administration: upload import, class selection, and
//! coursesurvey management.

pub mod domain;
pub mod import;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{
    Coursesurvey, CoursesurveyId, CoursesurveyUpdate, Klass, KlassId, SurveyRecord, SurveyRole,
};
pub use import::{ImportFormat, ImportReport, SurveyImportError, SurveyImporter};
pub use repository::{CoursesurveyRepository, KlassCatalog, SurveyRecordRepository};
pub use router::{surveys_router, SurveysState};
pub use service::{ClassRow, ManageError, SelectionOutcome, SurveyAdmin};
