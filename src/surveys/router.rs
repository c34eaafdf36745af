use std::collections::HashSet;
use std::io::Cursor;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::{Coursesurvey, CoursesurveyUpdate, KlassId};
use super::import::{ImportFormat, SurveyImporter};
use super::repository::{CoursesurveyRepository, KlassCatalog, SurveyRecordRepository};
use super::service::{ManageError, SurveyAdmin};

/// Shared state for the survey administration endpoints.
pub struct SurveysState<K, C, S> {
    pub admin: Arc<SurveyAdmin<K, C>>,
    pub records: Arc<S>,
}

impl<K, C, S> Clone for SurveysState<K, C, S> {
    fn clone(&self) -> Self {
        Self {
            admin: self.admin.clone(),
            records: self.records.clone(),
        }
    }
}

/// Router builder for survey upload and class administration.
pub fn surveys_router<K, C, S>(state: SurveysState<K, C, S>) -> Router
where
    K: KlassCatalog + 'static,
    C: CoursesurveyRepository + 'static,
    S: SurveyRecordRepository + 'static,
{
    Router::new()
        .route("/api/v1/surveys/import", post(import_handler::<K, C, S>))
        .route(
            "/api/v1/surveys/classes",
            get(classes_handler::<K, C, S>).post(select_classes_handler::<K, C, S>),
        )
        .route("/api/v1/surveys/manage", post(manage_handler::<K, C, S>))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct ImportRequest {
    csv: String,
    #[serde(default)]
    commit: bool,
    #[serde(default)]
    ta: bool,
}

#[derive(Debug, Serialize)]
struct ImportResponse {
    success: bool,
    allow_save: bool,
    errors: Vec<String>,
    info: Vec<String>,
}

async fn import_handler<K, C, S>(
    State(state): State<SurveysState<K, C, S>>,
    Json(request): Json<ImportRequest>,
) -> Response
where
    K: KlassCatalog + 'static,
    C: CoursesurveyRepository + 'static,
    S: SurveyRecordRepository + 'static,
{
    let reader = Cursor::new(request.csv.into_bytes());
    let mut report = match SurveyImporter::import(
        ImportFormat::Csv,
        reader,
        request.commit,
        request.ta,
        state.records.as_ref(),
    ) {
        Ok(report) => report,
        Err(err) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": err.to_string() })),
            )
                .into_response();
        }
    };

    let success = report.succeeded();
    if !success && request.commit {
        report
            .errors
            .push("No data was imported because of the above errors.".to_string());
    }

    let response = ImportResponse {
        success,
        allow_save: success && !request.commit,
        errors: report.errors,
        info: report.info,
    };
    (StatusCode::OK, Json(response)).into_response()
}

#[derive(Debug, Serialize)]
struct ClassRowView {
    klass_id: KlassId,
    course: String,
    section: u32,
    display: String,
    surveyed: bool,
    survey: Option<Coursesurvey>,
}

fn store_failure(err: impl std::fmt::Display) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": err.to_string() })),
    )
        .into_response()
}

async fn classes_handler<K, C, S>(State(state): State<SurveysState<K, C, S>>) -> Response
where
    K: KlassCatalog + 'static,
    C: CoursesurveyRepository + 'static,
    S: SurveyRecordRepository + 'static,
{
    let rows = match state.admin.class_rows() {
        Ok(rows) => rows,
        Err(err) => return store_failure(err),
    };

    let classes: Vec<ClassRowView> = rows
        .into_iter()
        .map(|row| ClassRowView {
            klass_id: row.klass.id,
            course: row.klass.course.clone(),
            section: row.klass.section,
            display: row.klass.display(),
            surveyed: row.survey.is_some(),
            survey: row.survey,
        })
        .collect();

    let payload = json!({
        "semester": state.admin.current_semester().code(),
        "coursesurveys_active": state.admin.coursesurveys_active(),
        "classes": classes,
    });
    (StatusCode::OK, Json(payload)).into_response()
}

#[derive(Debug, Deserialize)]
struct SelectClassesRequest {
    selected: Vec<KlassId>,
    coursesurveys_active: bool,
}

async fn select_classes_handler<K, C, S>(
    State(state): State<SurveysState<K, C, S>>,
    Json(request): Json<SelectClassesRequest>,
) -> Response
where
    K: KlassCatalog + 'static,
    C: CoursesurveyRepository + 'static,
    S: SurveyRecordRepository + 'static,
{
    let selected: HashSet<KlassId> = request.selected.into_iter().collect();
    match state
        .admin
        .select_classes(&selected, request.coursesurveys_active)
    {
        Ok(outcome) => (
            StatusCode::OK,
            Json(json!({
                "notice": "Updated classes to be surveyed",
                "created": outcome.created,
                "removed": outcome.removed,
            })),
        )
            .into_response(),
        Err(err) => store_failure(err),
    }
}

#[derive(Debug, Deserialize)]
struct ManageRequest {
    updates: Vec<CoursesurveyUpdate>,
}

async fn manage_handler<K, C, S>(
    State(state): State<SurveysState<K, C, S>>,
    Json(request): Json<ManageRequest>,
) -> Response
where
    K: KlassCatalog + 'static,
    C: CoursesurveyRepository + 'static,
    S: SurveyRecordRepository + 'static,
{
    match state.admin.manage_classes(&request.updates) {
        Ok(applied) => (
            StatusCode::OK,
            Json(json!({ "notice": "Updated classes", "applied": applied })),
        )
            .into_response(),
        Err(ManageError::UnknownSurvey(_)) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": "Error happened. Your input was probably not valid." })),
        )
            .into_response(),
        Err(ManageError::Repository(err)) => store_failure(err),
    }
}
