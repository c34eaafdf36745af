//! End-to-end coverage of the event endpoints: upcoming listing, RSVP
//! intake, roster admission, and start reminders, driven through the public
//! router.

mod common {
    use std::sync::{Arc, Mutex};

    use chrono::{DateTime, Duration, TimeZone, Utc};

    use chapter_ops::config::{Properties, PropertiesHandle};
    use chapter_ops::events::domain::{Block, BlockId, Event, EventId, EventType, Rsvp, RsvpId};
    use chapter_ops::events::notify::{Messenger, SendError};
    use chapter_ops::events::repository::EventRepository;
    use chapter_ops::events::EventsState;
    use chapter_ops::members::domain::{GroupId, Person, PersonId};
    use chapter_ops::members::repository::PersonDirectory;
    use chapter_ops::store::{MemoryEvents, MemoryPeople};

    pub(super) fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 1, 12, 0, 0).unwrap()
    }

    pub(super) fn event(id: u64, start_offset_hours: i64, cap: Option<u32>) -> Event {
        let start = now() + Duration::hours(start_offset_hours);
        Event {
            id: EventId(id),
            name: format!("event {id}"),
            slug: None,
            location: "Soda 306".to_string(),
            description: "details".to_string(),
            event_type: EventType::Social,
            start_time: start,
            end_time: start + Duration::hours(2),
            view_permission_group: None,
            rsvp_permission_group: Some(GroupId(1)),
            blocks: vec![Block {
                id: BlockId(id),
                name: "Session".to_string(),
                rsvp_cap: cap,
            }],
        }
    }

    pub(super) fn person(id: u64, groups: Vec<GroupId>, number: Option<&str>) -> Person {
        Person {
            id: PersonId(id),
            name: format!("person {id}"),
            sms_number: number.map(str::to_string),
            groups,
        }
    }

    pub(super) fn rsvp(id: u64, event: u64, person: u64, minutes_after: i64) -> Rsvp {
        Rsvp {
            id: RsvpId(id),
            event: EventId(event),
            person: PersonId(person),
            created_at: now() + Duration::minutes(minutes_after),
        }
    }

    /// Records sends, refusing one configured recipient.
    #[derive(Default)]
    pub(super) struct RecordingMessenger {
        pub(super) refuse: Option<PersonId>,
        pub(super) sent: Mutex<Vec<PersonId>>,
    }

    impl Messenger for RecordingMessenger {
        fn send_sms(&self, person: &Person, _message: &str) -> Result<(), SendError> {
            if self.refuse == Some(person.id) {
                return Err(SendError::Transport("gateway refused".to_string()));
            }
            self.sent.lock().expect("lock").push(person.id);
            Ok(())
        }
    }

    pub(super) struct Fixture {
        pub(super) events: Arc<MemoryEvents>,
        pub(super) people: Arc<MemoryPeople>,
        pub(super) messenger: Arc<RecordingMessenger>,
        pub(super) router: axum::Router,
    }

    pub(super) fn fixture_with_messenger(messenger: RecordingMessenger) -> Fixture {
        let events = Arc::new(MemoryEvents::default());
        let people = Arc::new(MemoryPeople::default());
        let messenger = Arc::new(messenger);
        let state = EventsState {
            events: events.clone(),
            people: people.clone(),
            messenger: messenger.clone(),
            properties: PropertiesHandle::new(Properties {
                semester: "20253".parse().expect("valid semester"),
                coursesurveys_active: false,
            }),
        };

        Fixture {
            events,
            people,
            messenger,
            router: chapter_ops::events::events_router(state),
        }
    }

    pub(super) fn fixture() -> Fixture {
        fixture_with_messenger(RecordingMessenger::default())
    }

    pub(super) fn seed_event(fixture: &Fixture, event: Event) {
        fixture.events.insert(event).expect("insert event");
    }

    pub(super) fn seed_person(fixture: &Fixture, person: Person) {
        fixture.people.insert(person).expect("insert person");
    }
}

mod roster {
    use super::common::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use chapter_ops::events::repository::EventRepository;
    use serde_json::Value;
    use tower::ServiceExt;

    #[tokio::test]
    async fn splits_admitted_and_waitlist_at_the_capacity() {
        let fixture = fixture();
        seed_event(&fixture, event(1, 24, Some(2)));
        for (rsvp_id, person, minutes) in [(1, 11, 20), (2, 12, 5), (3, 13, 40)] {
            fixture
                .events
                .add_rsvp(rsvp(rsvp_id, 1, person, minutes))
                .expect("insert rsvp");
        }

        let response = fixture
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/events/1/roster")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router dispatch");
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body");
        let payload: Value = serde_json::from_slice(&body).expect("json");

        let admitted: Vec<u64> = payload["admitted"]
            .as_array()
            .expect("admitted")
            .iter()
            .map(|entry| entry["person"].as_u64().expect("person"))
            .collect();
        let waitlist: Vec<u64> = payload["waitlist"]
            .as_array()
            .expect("waitlist")
            .iter()
            .map(|entry| entry["person"].as_u64().expect("person"))
            .collect();

        assert_eq!(admitted, vec![12, 11]);
        assert_eq!(waitlist, vec![13]);
    }

    #[tokio::test]
    async fn event_without_blocks_admits_everyone() {
        let fixture = fixture();
        let mut open = event(1, 24, None);
        open.blocks.clear();
        seed_event(&fixture, open);
        fixture
            .events
            .add_rsvp(rsvp(1, 1, 11, 0))
            .expect("insert rsvp");

        let response = fixture
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/events/1/roster")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router dispatch");

        let body = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body");
        let payload: Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(payload["admitted"].as_array().expect("admitted").len(), 1);
        assert!(payload["waitlist"].as_array().expect("waitlist").is_empty());
    }

    #[tokio::test]
    async fn unknown_event_is_not_found() {
        let fixture = fixture();
        let response = fixture
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/events/99/roster")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router dispatch");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

mod upcoming {
    use super::common::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use chapter_ops::members::domain::GroupId;
    use serde_json::Value;
    use tower::ServiceExt;

    async fn fetch(router: &axum::Router, uri: &str) -> Vec<Value> {
        let response = router
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
            .await
            .expect("router dispatch");
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body");
        serde_json::from_slice::<Vec<Value>>(&body).expect("json array")
    }

    #[tokio::test]
    async fn lists_week_window_in_start_order_and_honors_limit() {
        let fixture = fixture();
        seed_event(&fixture, event(1, 48, None));
        seed_event(&fixture, event(2, 2, None));
        seed_event(&fixture, event(3, 24 * 9, None)); // outside the window

        let uri = "/api/v1/events/upcoming?now=2025-10-01T12:00:00Z";
        let listed = fetch(&fixture.router, uri).await;
        let ids: Vec<u64> = listed
            .iter()
            .map(|event| event["id"].as_u64().expect("id"))
            .collect();
        assert_eq!(ids, vec![2, 1]);

        let limited = fetch(
            &fixture.router,
            "/api/v1/events/upcoming?limit=1&now=2025-10-01T12:00:00Z",
        )
        .await;
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0]["id"].as_u64(), Some(2));
    }

    #[tokio::test]
    async fn restricted_events_hide_from_outsiders() {
        let fixture = fixture();
        let mut restricted = event(1, 2, None);
        restricted.view_permission_group = Some(GroupId(7));
        seed_event(&fixture, restricted);
        seed_person(&fixture, person(5, vec![GroupId(7)], None));
        seed_person(&fixture, person(6, vec![], None));

        let anonymous = fetch(
            &fixture.router,
            "/api/v1/events/upcoming?now=2025-10-01T12:00:00Z",
        )
        .await;
        assert!(anonymous.is_empty());

        let outsider = fetch(
            &fixture.router,
            "/api/v1/events/upcoming?person_id=6&now=2025-10-01T12:00:00Z",
        )
        .await;
        assert!(outsider.is_empty());

        let member = fetch(
            &fixture.router,
            "/api/v1/events/upcoming?person_id=5&now=2025-10-01T12:00:00Z",
        )
        .await;
        assert_eq!(member.len(), 1);
    }

    #[tokio::test]
    async fn views_carry_formatted_times() {
        let fixture = fixture();
        seed_event(&fixture, event(1, 7, None)); // 19:00 - 21:00 same day

        let listed = fetch(
            &fixture.router,
            "/api/v1/events/upcoming?now=2025-10-01T12:00:00Z",
        )
        .await;
        assert_eq!(
            listed[0]["time_range"].as_str(),
            Some("Wed 10/01 07:00PM - 09:00PM")
        );
        assert_eq!(listed[0]["short_start_time"].as_str(), Some("7p"));
    }
}

mod detail {
    use super::common::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    async fn get_status(router: &axum::Router, uri: &str) -> StatusCode {
        router
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
            .await
            .expect("router dispatch")
            .status()
    }

    // The current-window check makes an event that has not started yet read
    // as absent, matching the behavior being reproduced.
    #[tokio::test]
    async fn future_events_are_not_viewable() {
        let fixture = fixture();
        seed_event(&fixture, event(1, 12, None));

        let status = get_status(
            &fixture.router,
            "/api/v1/events/1?now=2025-10-01T12:00:00Z",
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn started_events_in_the_semester_are_viewable() {
        let fixture = fixture();
        seed_event(&fixture, event(1, -12, None));

        let status = get_status(
            &fixture.router,
            "/api/v1/events/1?now=2025-10-01T12:00:00Z",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }
}

mod rsvps {
    use super::common::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chapter_ops::members::domain::GroupId;
    use serde_json::json;
    use tower::ServiceExt;

    async fn post_rsvp(router: &axum::Router, event: u64, person: u64) -> StatusCode {
        let request = Request::builder()
            .method("POST")
            .uri(format!("/api/v1/events/{event}/rsvps"))
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::to_vec(&json!({ "person_id": person })).expect("serialize"),
            ))
            .expect("request");
        router
            .clone()
            .oneshot(request)
            .await
            .expect("router dispatch")
            .status()
    }

    #[tokio::test]
    async fn member_of_the_rsvp_group_can_reserve() {
        let fixture = fixture();
        seed_event(&fixture, event(1, 24, Some(5)));
        seed_person(&fixture, person(5, vec![GroupId(1)], None));

        assert_eq!(post_rsvp(&fixture.router, 1, 5).await, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn outsiders_and_unknowns_are_forbidden() {
        let fixture = fixture();
        seed_event(&fixture, event(1, 24, Some(5)));
        seed_person(&fixture, person(6, vec![GroupId(9)], None));

        assert_eq!(post_rsvp(&fixture.router, 1, 6).await, StatusCode::FORBIDDEN);
        assert_eq!(post_rsvp(&fixture.router, 1, 404).await, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn blockless_events_do_not_take_rsvps() {
        let fixture = fixture();
        let mut closed = event(1, 24, None);
        closed.blocks.clear();
        seed_event(&fixture, closed);
        seed_person(&fixture, person(5, vec![GroupId(1)], None));

        assert_eq!(
            post_rsvp(&fixture.router, 1, 5).await,
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}

mod notify {
    use super::common::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use chapter_ops::events::repository::EventRepository;
    use chapter_ops::members::domain::PersonId;
    use serde_json::Value;
    use tower::ServiceExt;

    #[tokio::test]
    async fn one_failure_does_not_stop_the_other_reminders() {
        let fixture = fixture_with_messenger(RecordingMessenger {
            refuse: Some(PersonId(12)),
            ..RecordingMessenger::default()
        });
        seed_event(&fixture, event(1, 24, Some(10)));
        for id in [11, 12, 13] {
            seed_person(&fixture, person(id, vec![], Some("+15550000000")));
            fixture
                .events
                .add_rsvp(rsvp(id, 1, id, id as i64))
                .expect("insert rsvp");
        }

        let response = fixture
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/events/1/notify")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router dispatch");
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body");
        let payload: Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(payload["delivered"].as_u64(), Some(2));
        assert_eq!(payload["failures"].as_array().expect("failures").len(), 1);

        let sent = fixture.messenger.sent.lock().expect("lock");
        assert_eq!(sent.len(), 2);
    }
}

mod creation {
    use super::common::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn post_event(router: &axum::Router, payload: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/events")
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&payload).expect("serialize")))
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

    #[tokio::test]
    async fn valid_draft_is_created() {
        let fixture = fixture();
        let (status, body) = post_event(
            &fixture.router,
            json!({
                "name": "Resume Workshop",
                "location": "Room 306",
                "description": "Bring a draft.",
                "event_type": "industry",
                "start_time": "2025-10-01T18:00:00Z",
                "end_time": "2025-10-01T20:00:00Z",
                "blocks": [{ "name": "Session 1", "rsvp_cap": 30 }],
            }),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["allows_rsvps"].as_bool(), Some(true));
        assert_eq!(body["event_type"].as_str(), Some("Industry"));
    }

    #[tokio::test]
    async fn misordered_times_are_rejected_with_violations() {
        let fixture = fixture();
        let (status, body) = post_event(
            &fixture.router,
            json!({
                "name": "Resume Workshop",
                "location": "Room 306",
                "description": "Bring a draft.",
                "event_type": "industry",
                "start_time": "2025-10-01T20:00:00Z",
                "end_time": "2025-10-01T18:00:00Z",
            }),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let violations = body["violations"].as_array().expect("violations");
        assert_eq!(violations[0]["field"].as_str(), Some("end_time"));
        assert_eq!(
            violations[0]["message"].as_str(),
            Some("must be after start time")
        );
    }

    #[tokio::test]
    async fn blank_fields_are_rejected_with_violations() {
        let fixture = fixture();
        let (status, body) = post_event(
            &fixture.router,
            json!({
                "name": "",
                "location": "",
                "description": "Bring a draft.",
                "event_type": "industry",
                "start_time": "2025-10-01T18:00:00Z",
                "end_time": "2025-10-01T20:00:00Z",
            }),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["violations"].as_array().expect("violations").len(), 2);
    }
}
