//! Start-reminder notifications for an event's RSVPs. Delivery is
//! fire-and-forget per recipient: one failed send never aborts the rest.

use serde::Serialize;
use tracing::{info, warn};

use super::domain::{Event, Rsvp};
use crate::members::domain::{Person, PersonId};
use crate::members::repository::PersonDirectory;

/// Error raised by a message transport for a single recipient.
#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error("no contact number on file")]
    NoContact,
    #[error("transport unavailable: {0}")]
    Transport(String),
}

/// Outbound "send message to person" capability (SMS-like).
pub trait Messenger: Send + Sync {
    fn send_sms(&self, person: &Person, message: &str) -> Result<(), SendError>;
}

/// A transport that records the send in the log stream and succeeds. Used by
/// the demo server where no real gateway is wired up.
#[derive(Debug, Default, Clone)]
pub struct TracingMessenger;

impl Messenger for TracingMessenger {
    fn send_sms(&self, person: &Person, message: &str) -> Result<(), SendError> {
        let number = person.sms_number.as_deref().ok_or(SendError::NoContact)?;
        info!(person = person.id.0, %number, %message, "sms dispatched");
        Ok(())
    }
}

/// A recipient the reminder could not reach, with the reason.
#[derive(Debug, Clone, Serialize)]
pub struct NotifyFailure {
    pub person: PersonId,
    pub reason: String,
}

/// Per-event delivery summary.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NotifySummary {
    pub delivered: usize,
    pub failures: Vec<NotifyFailure>,
}

/// The reminder text sent to each RSVP'd person.
pub fn start_reminder(event: &Event) -> String {
    format!(
        "{} starts at {}. Meet at {}!",
        event.name,
        event.short_start_time(),
        event.location
    )
}

/// Send the start reminder to every RSVP's person. Failures (unknown
/// person, missing contact, transport trouble) are logged and collected;
/// the remaining sends continue regardless.
pub fn notify_rsvps(
    event: &Event,
    rsvps: &[Rsvp],
    directory: &dyn PersonDirectory,
    messenger: &dyn Messenger,
) -> NotifySummary {
    let message = start_reminder(event);
    let mut summary = NotifySummary::default();

    for rsvp in rsvps {
        let outcome = match directory.fetch(rsvp.person) {
            Ok(Some(person)) => messenger.send_sms(&person, &message),
            Ok(None) => Err(SendError::Transport("person not found".to_string())),
            Err(err) => Err(SendError::Transport(err.to_string())),
        };

        match outcome {
            Ok(()) => summary.delivered += 1,
            Err(err) => {
                warn!(event = event.id.0, person = rsvp.person.0, error = %err, "rsvp reminder failed");
                summary.failures.push(NotifyFailure {
                    person: rsvp.person,
                    reason: err.to_string(),
                });
            }
        }
    }

    summary
}
