//! Chapter events: validation, time formatting, visibility queries, RSVP
//! admission, and start reminders.

pub mod domain;
pub mod format;
pub mod notify;
pub mod query;
pub mod repository;
pub mod roster;
pub mod router;

pub use domain::{Block, BlockDraft, BlockId, Event, EventDraft, EventId, EventType, Rsvp, RsvpId};
pub use notify::{notify_rsvps, Messenger, NotifyFailure, NotifySummary, SendError, TracingMessenger};
pub use query::{can_rsvp, can_view, is_current, upcoming_events, visible_to};
pub use repository::EventRepository;
pub use roster::{roster, RsvpRoster};
pub use router::{events_router, EventsState};
