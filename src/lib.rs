//! Administrative backend for a student chapter: committee rosters,
//! candidate challenges, course surveys, and event RSVPs.

pub mod config;
pub mod error;
pub mod events;
pub mod members;
pub mod semester;
pub mod store;
pub mod surveys;
pub mod telemetry;
pub mod validate;

pub use config::{AppConfig, Properties, PropertiesHandle};
pub use error::AppError;
pub use semester::{Season, Semester, SemesterParseError};
pub use validate::FieldViolation;
