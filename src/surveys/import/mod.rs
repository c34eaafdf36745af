//! Survey upload orchestration: parse a tabular export, report row-level
//! problems, and either dry-run or commit the resulting records.

mod parser;

use std::io::Read;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use super::domain::{SurveyRecord, SurveyRole};
use super::repository::SurveyRecordRepository;
use crate::store::RepositoryError;
use parser::RowOutcome;

/// Tabular formats the importer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    Csv,
}

/// What the upload produced: row-level errors and operator-facing notes.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportReport {
    pub errors: Vec<String>,
    pub info: Vec<String>,
}

impl ImportReport {
    pub fn succeeded(&self) -> bool {
        self.errors.is_empty()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SurveyImportError {
    #[error("failed to read survey upload: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not store survey records: {0}")]
    Repository(#[from] RepositoryError),
}

pub struct SurveyImporter;

impl SurveyImporter {
    pub fn import_path<P: AsRef<Path>>(
        format: ImportFormat,
        path: P,
        commit: bool,
        ta_mode: bool,
        records: &dyn SurveyRecordRepository,
    ) -> Result<ImportReport, SurveyImportError> {
        let file = std::fs::File::open(path)?;
        Self::import(format, file, commit, ta_mode, records)
    }

    /// Parse and validate every row, collecting `"row N: ..."` errors
    /// without aborting the remaining rows. With `commit` unset this is a
    /// dry run. With `commit` set, records persist only when every row was
    /// valid: a single bad row blocks the whole upload.
    pub fn import<R: Read>(
        format: ImportFormat,
        reader: R,
        commit: bool,
        ta_mode: bool,
        records: &dyn SurveyRecordRepository,
    ) -> Result<ImportReport, SurveyImportError> {
        let ImportFormat::Csv = format;

        let role = if ta_mode {
            SurveyRole::TeachingAssistant
        } else {
            SurveyRole::Instructor
        };

        let mut report = ImportReport::default();
        let mut valid = Vec::new();

        for outcome in parser::parse_rows(reader) {
            match outcome {
                RowOutcome::Valid(entry) => valid.push(SurveyRecord {
                    semester: entry.semester,
                    course: entry.course,
                    section: entry.section,
                    instructor: entry.instructor,
                    role,
                    responses: entry.responses,
                    rating: entry.rating,
                }),
                RowOutcome::Invalid { row, problems } => {
                    for problem in problems {
                        report.errors.push(format!("row {row}: {problem}"));
                    }
                }
            }
        }

        report.info.push(format!(
            "{} {} survey row(s) parsed.",
            valid.len(),
            role.label().to_lowercase()
        ));

        if !commit {
            report
                .info
                .push("Dry run: rows were validated but not saved.".to_string());
            return Ok(report);
        }

        if !report.succeeded() {
            // All-or-nothing: the caller reports that nothing was imported.
            return Ok(report);
        }

        let imported = valid.len();
        for record in valid {
            records.insert(record)?;
        }
        info!(imported, ta = ta_mode, "survey upload committed");
        report
            .info
            .push(format!("Imported {imported} survey record(s)."));

        Ok(report)
    }
}
