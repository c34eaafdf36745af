//! First-come-first-served RSVP admission against the event's capacity.

use serde::Serialize;

use super::domain::{Event, Rsvp};

/// The partition of an event's RSVPs into the admitted list and the
/// waitlist. Every RSVP appears in exactly one of the two, and admission
/// order is monotonic in arrival time.
#[derive(Debug, Clone, Serialize)]
pub struct RsvpRoster {
    pub admitted: Vec<Rsvp>,
    pub waitlist: Vec<Rsvp>,
}

impl RsvpRoster {
    pub fn total(&self) -> usize {
        self.admitted.len() + self.waitlist.len()
    }
}

/// Order the RSVPs by creation time (stable, so ties keep their stored
/// order) and split them at the event's capacity. No capacity, or a capacity
/// below 1, admits everyone.
pub fn roster(event: &Event, rsvps: &[Rsvp]) -> RsvpRoster {
    let mut by_arrival: Vec<Rsvp> = rsvps.to_vec();
    by_arrival.sort_by_key(|rsvp| rsvp.created_at);

    match event.cap() {
        Some(cap) if cap >= 1 => {
            let split = (cap as usize).min(by_arrival.len());
            let waitlist = by_arrival.split_off(split);
            RsvpRoster {
                admitted: by_arrival,
                waitlist,
            }
        }
        _ => RsvpRoster {
            admitted: by_arrival,
            waitlist: Vec::new(),
        },
    }
}
