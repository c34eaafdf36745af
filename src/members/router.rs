use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::{
    Challenge, ChallengeId, ChallengeStatus, Committeeship, Person, PersonId, Position,
};
use super::repository::{ChallengeRepository, CommitteeshipRepository, PersonDirectory};
use super::validate::CommitteeshipDraft;
use crate::config::PropertiesHandle;
use crate::semester::Semester;
use crate::store::RepositoryError;

static CHALLENGE_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_challenge_id() -> ChallengeId {
    ChallengeId(CHALLENGE_SEQUENCE.fetch_add(1, Ordering::Relaxed))
}

/// Shared state for the membership endpoints.
pub struct MembersState<C, P, H> {
    pub committeeships: Arc<C>,
    pub people: Arc<P>,
    pub challenges: Arc<H>,
    pub properties: PropertiesHandle,
}

impl<C, P, H> Clone for MembersState<C, P, H> {
    fn clone(&self) -> Self {
        Self {
            committeeships: self.committeeships.clone(),
            people: self.people.clone(),
            challenges: self.challenges.clone(),
            properties: self.properties.clone(),
        }
    }
}

/// Router builder for committeeships, candidates, and challenges.
pub fn members_router<C, P, H>(state: MembersState<C, P, H>) -> Router
where
    C: CommitteeshipRepository + 'static,
    P: PersonDirectory + 'static,
    H: ChallengeRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/committeeships",
            get(list_handler::<C, P, H>).post(create_handler::<C, P, H>),
        )
        .route("/api/v1/candidates", get(candidates_handler::<C, P, H>))
        .route(
            "/api/v1/candidates/:person_id/challenges",
            get(challenges_handler::<C, P, H>).post(issue_challenge_handler::<C, P, H>),
        )
        .route(
            "/api/v1/challenges/:challenge_id/status",
            post(challenge_status_handler::<C, P, H>),
        )
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct CommitteeshipView {
    person: PersonId,
    committee: &'static str,
    semester: String,
    title: &'static str,
    nice_position: Option<String>,
    nice_semester: Option<String>,
}

impl CommitteeshipView {
    fn from_record(record: &Committeeship) -> Self {
        Self {
            person: record.person,
            committee: record.committee.code(),
            semester: record.semester.code(),
            title: record.position.code(),
            nice_position: record.nice_position(),
            nice_semester: record.nice_semester(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChallengeView {
    id: ChallengeId,
    name: String,
    description: String,
    status: ChallengeStatus,
    status_label: &'static str,
    officer: PersonId,
}

impl ChallengeView {
    fn from_challenge(challenge: &Challenge) -> Self {
        Self {
            id: challenge.id,
            name: challenge.name.clone(),
            description: challenge.description.clone(),
            status: challenge.status,
            status_label: challenge.status.label(),
            officer: challenge.officer,
        }
    }
}

fn store_failure(err: impl std::fmt::Display) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": err.to_string() })),
    )
        .into_response()
}

#[derive(Debug, Deserialize)]
struct ListParams {
    #[serde(default)]
    semester: Option<String>,
}

async fn list_handler<C, P, H>(
    State(state): State<MembersState<C, P, H>>,
    Query(params): Query<ListParams>,
) -> Response
where
    C: CommitteeshipRepository + 'static,
    P: PersonDirectory + 'static,
    H: ChallengeRepository + 'static,
{
    let semester = match params.semester {
        Some(raw) => match raw.parse::<Semester>() {
            Ok(semester) => semester,
            Err(err) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": err.to_string() })),
                )
                    .into_response();
            }
        },
        None => state.properties.semester(),
    };

    match state.committeeships.for_semester(semester) {
        Ok(records) => {
            let views: Vec<CommitteeshipView> =
                records.iter().map(CommitteeshipView::from_record).collect();
            (StatusCode::OK, Json(views)).into_response()
        }
        Err(err) => store_failure(err),
    }
}

async fn create_handler<C, P, H>(
    State(state): State<MembersState<C, P, H>>,
    Json(draft): Json<CommitteeshipDraft>,
) -> Response
where
    C: CommitteeshipRepository + 'static,
    P: PersonDirectory + 'static,
    H: ChallengeRepository + 'static,
{
    let existing = match state.committeeships.all() {
        Ok(existing) => existing,
        Err(err) => return store_failure(err),
    };

    let record = match draft.validate(&existing) {
        Ok(record) => record,
        Err(violations) => {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "violations": violations })),
            )
                .into_response();
        }
    };

    let view = CommitteeshipView::from_record(&record);
    match state.committeeships.insert(record) {
        Ok(()) => (StatusCode::CREATED, Json(view)).into_response(),
        Err(RepositoryError::Conflict) => {
            // A racing write beat the validation pass; report it the same way.
            let violation = json!({
                "violations": [{ "field": "committee", "message": "has already been taken" }]
            });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(violation)).into_response()
        }
        Err(err) => store_failure(err),
    }
}

#[derive(Debug, Serialize)]
struct CandidateView {
    person: PersonId,
    name: String,
    challenges: Vec<ChallengeView>,
}

/// Current-semester candidates with their challenge progress.
async fn candidates_handler<C, P, H>(State(state): State<MembersState<C, P, H>>) -> Response
where
    C: CommitteeshipRepository + 'static,
    P: PersonDirectory + 'static,
    H: ChallengeRepository + 'static,
{
    let semester = state.properties.semester();
    let records = match state.committeeships.for_semester(semester) {
        Ok(records) => records,
        Err(err) => return store_failure(err),
    };

    let mut views = Vec::new();
    let mut seen = std::collections::HashSet::new();
    for record in records
        .iter()
        .filter(|record| record.position == Position::Candidate)
    {
        if !seen.insert(record.person) {
            continue;
        }

        let name = match state.people.fetch(record.person) {
            Ok(Some(Person { name, .. })) => name,
            Ok(None) => continue,
            Err(err) => return store_failure(err),
        };
        let challenges = match state.challenges.for_candidate(record.person) {
            Ok(challenges) => challenges
                .iter()
                .map(ChallengeView::from_challenge)
                .collect(),
            Err(err) => return store_failure(err),
        };

        views.push(CandidateView {
            person: record.person,
            name,
            challenges,
        });
    }

    views.sort_by_key(|view| view.person);
    (StatusCode::OK, Json(views)).into_response()
}

async fn challenges_handler<C, P, H>(
    State(state): State<MembersState<C, P, H>>,
    Path(person_id): Path<u64>,
) -> Response
where
    C: CommitteeshipRepository + 'static,
    P: PersonDirectory + 'static,
    H: ChallengeRepository + 'static,
{
    match state.challenges.for_candidate(PersonId(person_id)) {
        Ok(challenges) => {
            let views: Vec<ChallengeView> = challenges
                .iter()
                .map(ChallengeView::from_challenge)
                .collect();
            (StatusCode::OK, Json(views)).into_response()
        }
        Err(err) => store_failure(err),
    }
}

#[derive(Debug, Deserialize)]
struct ChallengeRequest {
    name: String,
    description: String,
    officer: u64,
}

/// New challenges start out pending.
async fn issue_challenge_handler<C, P, H>(
    State(state): State<MembersState<C, P, H>>,
    Path(person_id): Path<u64>,
    Json(request): Json<ChallengeRequest>,
) -> Response
where
    C: CommitteeshipRepository + 'static,
    P: PersonDirectory + 'static,
    H: ChallengeRepository + 'static,
{
    let challenge = Challenge {
        id: next_challenge_id(),
        name: request.name,
        description: request.description,
        status: ChallengeStatus::Pending,
        candidate: PersonId(person_id),
        officer: PersonId(request.officer),
    };

    let view = ChallengeView::from_challenge(&challenge);
    match state.challenges.insert(challenge) {
        Ok(()) => (StatusCode::CREATED, Json(view)).into_response(),
        Err(err) => store_failure(err),
    }
}

#[derive(Debug, Deserialize)]
struct StatusRequest {
    status: ChallengeStatus,
}

async fn challenge_status_handler<C, P, H>(
    State(state): State<MembersState<C, P, H>>,
    Path(challenge_id): Path<u64>,
    Json(request): Json<StatusRequest>,
) -> Response
where
    C: CommitteeshipRepository + 'static,
    P: PersonDirectory + 'static,
    H: ChallengeRepository + 'static,
{
    match state
        .challenges
        .set_status(ChallengeId(challenge_id), request.status)
    {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "id": challenge_id,
                "status_label": request.status.label(),
            })),
        )
            .into_response(),
        Err(RepositoryError::NotFound) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "challenge not found" })),
        )
            .into_response(),
        Err(err) => store_failure(err),
    }
}
