use super::domain::{Event, EventId, Rsvp};
use crate::store::RepositoryError;

/// Storage abstraction for events and their RSVPs. Removing an event
/// cascades to its RSVPs; blocks live on the event record itself.
pub trait EventRepository: Send + Sync {
    fn insert(&self, event: Event) -> Result<(), RepositoryError>;
    fn fetch(&self, id: EventId) -> Result<Option<Event>, RepositoryError>;
    fn all(&self) -> Result<Vec<Event>, RepositoryError>;
    fn remove(&self, id: EventId) -> Result<(), RepositoryError>;
    fn add_rsvp(&self, rsvp: Rsvp) -> Result<(), RepositoryError>;
    fn rsvps(&self, event: EventId) -> Result<Vec<Rsvp>, RepositoryError>;
}
