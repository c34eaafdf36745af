use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::members::domain::{GroupId, PersonId};
use crate::validate::FieldViolation;

/// Identifier wrapper for events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(pub u64);

/// Identifier wrapper for capacity blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockId(pub u64);

/// Identifier wrapper for RSVPs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RsvpId(pub u64);

/// Closed classification of chapter events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Social,
    Industry,
    Service,
    Meeting,
}

impl EventType {
    pub const ALL: [Self; 4] = [Self::Social, Self::Industry, Self::Service, Self::Meeting];

    pub const fn code(self) -> &'static str {
        match self {
            Self::Social => "social",
            Self::Industry => "industry",
            Self::Service => "service",
            Self::Meeting => "meeting",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.code() == code)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Social => "Social",
            Self::Industry => "Industry",
            Self::Service => "Service",
            Self::Meeting => "Meeting",
        }
    }
}

/// A capacity-bearing subdivision of an event. The first block's cap governs
/// RSVP admission for the whole event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    pub name: String,
    pub rsvp_cap: Option<u32>,
}

/// A scheduled chapter event. Owns its blocks; RSVPs live in the event
/// repository and are deleted with the event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub name: String,
    pub slug: Option<String>,
    pub location: String,
    pub description: String,
    pub event_type: EventType,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub view_permission_group: Option<GroupId>,
    pub rsvp_permission_group: Option<GroupId>,
    pub blocks: Vec<Block>,
}

impl Event {
    /// The RSVP cap taken from the first block. Absent when the event has no
    /// blocks or the block carries no cap.
    pub fn cap(&self) -> Option<u32> {
        self.blocks.first().and_then(|block| block.rsvp_cap)
    }

    /// RSVPs are open iff at least one block exists.
    pub fn allows_rsvps(&self) -> bool {
        !self.blocks.is_empty()
    }
}

/// A person's reservation for an event. The creation timestamp establishes
/// arrival order for admission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rsvp {
    pub id: RsvpId,
    pub event: EventId,
    pub person: PersonId,
    pub created_at: DateTime<Utc>,
}

/// An inbound event as it arrives from a form, before field checks.
#[derive(Debug, Clone, Deserialize)]
pub struct EventDraft {
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    pub location: String,
    pub description: String,
    pub event_type: String,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub view_permission_group: Option<GroupId>,
    #[serde(default)]
    pub rsvp_permission_group: Option<GroupId>,
    #[serde(default)]
    pub blocks: Vec<BlockDraft>,
}

/// Block fields accepted on event creation.
#[derive(Debug, Clone, Deserialize)]
pub struct BlockDraft {
    pub name: String,
    #[serde(default)]
    pub rsvp_cap: Option<u32>,
}

impl EventDraft {
    /// Presence checks on every descriptive field, plus the time-range rule:
    /// the end must be strictly after the start.
    pub fn validate(&self) -> Vec<FieldViolation> {
        let mut violations = Vec::new();

        for (field, value) in [
            ("name", &self.name),
            ("location", &self.location),
            ("description", &self.description),
        ] {
            if value.trim().is_empty() {
                violations.push(FieldViolation::new(field, "can't be blank"));
            }
        }

        if self.event_type.trim().is_empty() {
            violations.push(FieldViolation::new("event_type", "can't be blank"));
        } else if EventType::from_code(self.event_type.trim()).is_none() {
            violations.push(FieldViolation::new("event_type", "is not recognized"));
        }

        if self.start_time.is_none() {
            violations.push(FieldViolation::new("start_time", "can't be blank"));
        }
        if self.end_time.is_none() {
            violations.push(FieldViolation::new("end_time", "can't be blank"));
        }

        if let (Some(start), Some(end)) = (self.start_time, self.end_time) {
            if start >= end {
                violations.push(FieldViolation::new("end_time", "must be after start time"));
            }
        }

        violations
    }

    /// Convert into a typed event under the given id, or surface the
    /// violations that block it.
    pub fn into_event(self, id: EventId, block_ids: &mut impl FnMut() -> BlockId) -> Result<Event, Vec<FieldViolation>> {
        let violations = self.validate();
        if !violations.is_empty() {
            return Err(violations);
        }

        let (event_type, start_time, end_time) = match (
            EventType::from_code(self.event_type.trim()),
            self.start_time,
            self.end_time,
        ) {
            (Some(event_type), Some(start_time), Some(end_time)) => {
                (event_type, start_time, end_time)
            }
            // validate() already rejected these shapes.
            _ => return Err(self.validate()),
        };

        Ok(Event {
            id,
            name: self.name,
            slug: self.slug,
            location: self.location,
            description: self.description,
            event_type,
            start_time,
            end_time,
            view_permission_group: self.view_permission_group,
            rsvp_permission_group: self.rsvp_permission_group,
            blocks: self
                .blocks
                .into_iter()
                .map(|draft| Block {
                    id: block_ids(),
                    name: draft.name,
                    rsvp_cap: draft.rsvp_cap,
                })
                .collect(),
        })
    }
}
