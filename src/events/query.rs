//! Event visibility and time-window queries. Every function takes the clock
//! instant explicitly so callers (and tests) control "now".

use chrono::{DateTime, Duration, Utc};

use super::domain::Event;
use crate::members::domain::Person;

/// Permission half of the visibility check: an unrestricted event is visible
/// to everyone; a restricted one only to members of its view group. An
/// anonymous viewer sees unrestricted events only.
pub fn visible_to(event: &Event, viewer: Option<&Person>) -> bool {
    match (event.view_permission_group, viewer) {
        (None, _) => true,
        (Some(_), None) => false,
        (Some(group), Some(person)) => person.in_group(group),
    }
}

/// Whether the event falls in the "current" window: started after the
/// semester began and before now. Future events are therefore never current.
pub fn is_current(event: &Event, semester_start: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    event.start_time > semester_start && event.start_time < now
}

/// Full view check: permission plus the current-window test. The
/// current-window conjunction means an event that has not started yet is not
/// viewable; this matches the stored behavior being reproduced.
pub fn can_view(
    event: &Event,
    viewer: Option<&Person>,
    semester_start: DateTime<Utc>,
    now: DateTime<Utc>,
) -> bool {
    visible_to(event, viewer) && is_current(event, semester_start, now)
}

/// Whether the viewer may RSVP. Anonymous viewers never can; otherwise the
/// event must carry an RSVP group the viewer belongs to. This checks
/// permission only; whether RSVPs are open is `Event::allows_rsvps`.
pub fn can_rsvp(event: &Event, viewer: Option<&Person>) -> bool {
    match (viewer, event.rsvp_permission_group) {
        (Some(person), Some(group)) => person.in_group(group),
        _ => false,
    }
}

/// Events the viewer may see that end within the next seven days, ascending
/// by start time. A limit of 0 means unbounded.
pub fn upcoming_events<'a>(
    events: &'a [Event],
    limit: usize,
    viewer: Option<&Person>,
    now: DateTime<Utc>,
) -> Vec<&'a Event> {
    let window_end = now + Duration::days(7);
    let mut upcoming: Vec<&Event> = events
        .iter()
        .filter(|event| visible_to(event, viewer))
        .filter(|event| event.end_time >= now && event.end_time <= window_end)
        .collect();

    upcoming.sort_by_key(|event| event.start_time);

    if limit != 0 {
        upcoming.truncate(limit);
    }
    upcoming
}
