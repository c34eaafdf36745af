//! End-to-end coverage of committeeship intake and the candidate/challenge
//! listings, driven through the public router.

mod common {
    use std::sync::Arc;

    use chapter_ops::config::{Properties, PropertiesHandle};
    use chapter_ops::members::domain::{Person, PersonId};
    use chapter_ops::members::repository::PersonDirectory;
    use chapter_ops::members::MembersState;
    use chapter_ops::store::{MemoryChallenges, MemoryCommitteeships, MemoryPeople};

    pub(super) struct Fixture {
        pub(super) people: Arc<MemoryPeople>,
        pub(super) router: axum::Router,
    }

    pub(super) fn fixture() -> Fixture {
        let people = Arc::new(MemoryPeople::default());
        let state = MembersState {
            committeeships: Arc::new(MemoryCommitteeships::default()),
            people: people.clone(),
            challenges: Arc::new(MemoryChallenges::default()),
            properties: PropertiesHandle::new(Properties {
                semester: "20103".parse().expect("valid semester"),
                coursesurveys_active: false,
            }),
        };

        Fixture {
            people,
            router: chapter_ops::members::members_router(state),
        }
    }

    pub(super) fn seed_person(fixture: &Fixture, id: u64, name: &str) {
        fixture
            .people
            .insert(Person {
                id: PersonId(id),
                name: name.to_string(),
                sms_number: None,
                groups: Vec::new(),
            })
            .expect("insert person");
    }
}

mod helpers {
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    pub(super) async fn post_json(
        router: &axum::Router,
        uri: &str,
        payload: &Value,
    ) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(payload).expect("serialize")))
            .expect("request");
        let response = router
            .clone()
            .oneshot(request)
            .await
            .expect("router dispatch");
        let status = response.status();
        let body = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body");
        (status, serde_json::from_slice(&body).expect("json"))
    }

    pub(super) async fn get_json(router: &axum::Router, uri: &str) -> (StatusCode, Value) {
        let response = router
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
            .await
            .expect("router dispatch");
        let status = response.status();
        let body = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body");
        (status, serde_json::from_slice(&body).expect("json"))
    }
}

mod intake {
    use super::common::*;
    use super::helpers::*;
    use axum::http::StatusCode;
    use serde_json::json;

    fn draft() -> serde_json::Value {
        json!({
            "person": 1,
            "committee": "compserv",
            "semester": "20103",
            "title": "officer",
        })
    }

    #[tokio::test]
    async fn valid_draft_is_created_with_renderings() {
        let fixture = fixture();
        let (status, body) = post_json(&fixture.router, "/api/v1/committeeships", &draft()).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["nice_position"].as_str(), Some("Computing Services Officer"));
        assert_eq!(body["nice_semester"].as_str(), Some("Fall 2010"));
    }

    #[tokio::test]
    async fn field_problems_come_back_as_violations() {
        let fixture = fixture();
        let mut bad = draft();
        bad["semester"] = json!("20105");
        bad["committee"] = json!("pubrel");

        let (status, body) = post_json(&fixture.router, "/api/v1/committeeships", &bad).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let violations = body["violations"].as_array().expect("violations");
        let messages: Vec<&str> = violations
            .iter()
            .map(|violation| violation["message"].as_str().expect("message"))
            .collect();
        assert!(messages.contains(&"Committee not recognized."));
        assert!(messages.contains(&"Not a valid semester."));
    }

    #[tokio::test]
    async fn duplicate_triple_is_taken() {
        let fixture = fixture();
        let (status, _) = post_json(&fixture.router, "/api/v1/committeeships", &draft()).await;
        assert_eq!(status, StatusCode::CREATED);

        let mut same_triple = draft();
        same_triple["title"] = json!("cmember");
        let (status, body) =
            post_json(&fixture.router, "/api/v1/committeeships", &same_triple).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            body["violations"][0]["message"].as_str(),
            Some("has already been taken")
        );
    }

    #[tokio::test]
    async fn listing_defaults_to_the_current_semester() {
        let fixture = fixture();
        post_json(&fixture.router, "/api/v1/committeeships", &draft()).await;

        let mut other_semester = draft();
        other_semester["semester"] = json!("20111");
        post_json(&fixture.router, "/api/v1/committeeships", &other_semester).await;

        let (status, body) = get_json(&fixture.router, "/api/v1/committeeships").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().expect("list").len(), 1);

        let (_, body) =
            get_json(&fixture.router, "/api/v1/committeeships?semester=20111").await;
        assert_eq!(body.as_array().expect("list").len(), 1);
        assert_eq!(body[0]["semester"].as_str(), Some("20111"));
    }

    #[tokio::test]
    async fn malformed_semester_filter_is_a_bad_request() {
        let fixture = fixture();
        let (status, _) =
            get_json(&fixture.router, "/api/v1/committeeships?semester=duck").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}

mod candidates {
    use super::common::*;
    use super::helpers::*;
    use axum::http::StatusCode;
    use serde_json::json;

    async fn enroll_candidate(fixture: &Fixture, person: u64) {
        let (status, _) = post_json(
            &fixture.router,
            "/api/v1/committeeships",
            &json!({
                "person": person,
                "committee": "deprel",
                "semester": "20103",
                "title": "candidate",
            }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn lists_current_candidates_with_their_challenges() {
        let fixture = fixture();
        seed_person(&fixture, 1, "Dana");
        seed_person(&fixture, 2, "Robin");
        enroll_candidate(&fixture, 1).await;
        enroll_candidate(&fixture, 2).await;

        let (status, challenge) = post_json(
            &fixture.router,
            "/api/v1/candidates/1/challenges",
            &json!({
                "name": "Teach a review session",
                "description": "Any upper-division course.",
                "officer": 9,
            }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(challenge["status_label"].as_str(), Some("Pending"));

        let (status, body) = get_json(&fixture.router, "/api/v1/candidates").await;
        assert_eq!(status, StatusCode::OK);
        let list = body.as_array().expect("candidates");
        assert_eq!(list.len(), 2);
        assert_eq!(list[0]["name"].as_str(), Some("Dana"));
        assert_eq!(
            list[0]["challenges"][0]["status_label"].as_str(),
            Some("Pending")
        );
        assert!(list[1]["challenges"].as_array().expect("list").is_empty());
    }

    #[tokio::test]
    async fn challenge_status_moves_through_the_three_states() {
        let fixture = fixture();
        seed_person(&fixture, 1, "Dana");
        enroll_candidate(&fixture, 1).await;

        let (_, challenge) = post_json(
            &fixture.router,
            "/api/v1/candidates/1/challenges",
            &json!({
                "name": "Staff an info session",
                "description": "Either recruiting night works.",
                "officer": 9,
            }),
        )
        .await;
        let id = challenge["id"].as_u64().expect("id");

        let (status, body) = post_json(
            &fixture.router,
            &format!("/api/v1/challenges/{id}/status"),
            &json!({ "status": "confirmed" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status_label"].as_str(), Some("Confirmed"));

        let (_, listed) = get_json(&fixture.router, "/api/v1/candidates/1/challenges").await;
        assert_eq!(listed[0]["status"].as_str(), Some("confirmed"));

        let (status, _) = post_json(
            &fixture.router,
            "/api/v1/challenges/999/status",
            &json!({ "status": "rejected" }),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
