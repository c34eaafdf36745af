//! In-memory reference implementations of the repository traits, used by the
//! demo server and the test suites. Uniqueness constraints are enforced at
//! insert, mirroring what a relational store's indexes would reject.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::RepositoryError;
use crate::events::domain::{Event, EventId, Rsvp};
use crate::events::repository::EventRepository;
use crate::members::domain::{Challenge, ChallengeId, ChallengeStatus, Committeeship, Person, PersonId};
use crate::members::repository::{ChallengeRepository, CommitteeshipRepository, PersonDirectory};
use crate::semester::Semester;
use crate::surveys::domain::{Coursesurvey, CoursesurveyId, Klass, KlassId, SurveyRecord};
use crate::surveys::repository::{CoursesurveyRepository, KlassCatalog, SurveyRecordRepository};

fn guard<T>(lock: &Mutex<T>) -> Result<MutexGuard<'_, T>, RepositoryError> {
    lock.lock()
        .map_err(|_| RepositoryError::Unavailable("store lock poisoned".to_string()))
}

#[derive(Default)]
pub struct MemoryCommitteeships {
    records: Mutex<Vec<Committeeship>>,
}

impl CommitteeshipRepository for MemoryCommitteeships {
    fn insert(&self, record: Committeeship) -> Result<(), RepositoryError> {
        let mut records = guard(&self.records)?;
        let duplicate = records.iter().any(|existing| {
            existing.person == record.person
                && existing.committee == record.committee
                && existing.semester == record.semester
        });
        if duplicate {
            return Err(RepositoryError::Conflict);
        }
        records.push(record);
        Ok(())
    }

    fn all(&self) -> Result<Vec<Committeeship>, RepositoryError> {
        Ok(guard(&self.records)?.clone())
    }

    fn for_semester(&self, semester: Semester) -> Result<Vec<Committeeship>, RepositoryError> {
        Ok(guard(&self.records)?
            .iter()
            .filter(|record| record.semester == semester)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct MemoryPeople {
    people: Mutex<HashMap<PersonId, Person>>,
}

impl PersonDirectory for MemoryPeople {
    fn fetch(&self, id: PersonId) -> Result<Option<Person>, RepositoryError> {
        Ok(guard(&self.people)?.get(&id).cloned())
    }

    fn insert(&self, person: Person) -> Result<(), RepositoryError> {
        let mut people = guard(&self.people)?;
        if people.contains_key(&person.id) {
            return Err(RepositoryError::Conflict);
        }
        people.insert(person.id, person);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryChallenges {
    challenges: Mutex<Vec<Challenge>>,
}

impl ChallengeRepository for MemoryChallenges {
    fn insert(&self, challenge: Challenge) -> Result<(), RepositoryError> {
        let mut challenges = guard(&self.challenges)?;
        if challenges.iter().any(|existing| existing.id == challenge.id) {
            return Err(RepositoryError::Conflict);
        }
        challenges.push(challenge);
        Ok(())
    }

    fn for_candidate(&self, candidate: PersonId) -> Result<Vec<Challenge>, RepositoryError> {
        Ok(guard(&self.challenges)?
            .iter()
            .filter(|challenge| challenge.candidate == candidate)
            .cloned()
            .collect())
    }

    fn set_status(&self, id: ChallengeId, status: ChallengeStatus) -> Result<(), RepositoryError> {
        let mut challenges = guard(&self.challenges)?;
        match challenges.iter_mut().find(|challenge| challenge.id == id) {
            Some(challenge) => {
                challenge.status = status;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }
}

#[derive(Default)]
struct EventsInner {
    events: HashMap<EventId, Event>,
    rsvps: Vec<Rsvp>,
}

#[derive(Default)]
pub struct MemoryEvents {
    inner: Mutex<EventsInner>,
}

impl EventRepository for MemoryEvents {
    fn insert(&self, event: Event) -> Result<(), RepositoryError> {
        let mut inner = guard(&self.inner)?;
        if inner.events.contains_key(&event.id) {
            return Err(RepositoryError::Conflict);
        }
        inner.events.insert(event.id, event);
        Ok(())
    }

    fn fetch(&self, id: EventId) -> Result<Option<Event>, RepositoryError> {
        Ok(guard(&self.inner)?.events.get(&id).cloned())
    }

    fn all(&self) -> Result<Vec<Event>, RepositoryError> {
        Ok(guard(&self.inner)?.events.values().cloned().collect())
    }

    fn remove(&self, id: EventId) -> Result<(), RepositoryError> {
        let mut inner = guard(&self.inner)?;
        if inner.events.remove(&id).is_none() {
            return Err(RepositoryError::NotFound);
        }
        // Deleting an event cascades to its RSVPs.
        inner.rsvps.retain(|rsvp| rsvp.event != id);
        Ok(())
    }

    fn add_rsvp(&self, rsvp: Rsvp) -> Result<(), RepositoryError> {
        let mut inner = guard(&self.inner)?;
        if !inner.events.contains_key(&rsvp.event) {
            return Err(RepositoryError::NotFound);
        }
        inner.rsvps.push(rsvp);
        Ok(())
    }

    /// RSVPs come back in stored order, which is what breaks creation-time
    /// ties during admission.
    fn rsvps(&self, event: EventId) -> Result<Vec<Rsvp>, RepositoryError> {
        Ok(guard(&self.inner)?
            .rsvps
            .iter()
            .filter(|rsvp| rsvp.event == event)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct MemoryKlasses {
    klasses: Mutex<Vec<Klass>>,
}

impl KlassCatalog for MemoryKlasses {
    fn insert(&self, klass: Klass) -> Result<(), RepositoryError> {
        let mut klasses = guard(&self.klasses)?;
        if klasses.iter().any(|existing| existing.id == klass.id) {
            return Err(RepositoryError::Conflict);
        }
        klasses.push(klass);
        Ok(())
    }

    fn for_semester(&self, semester: Semester) -> Result<Vec<Klass>, RepositoryError> {
        Ok(guard(&self.klasses)?
            .iter()
            .filter(|klass| klass.semester == semester)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct MemoryCoursesurveys {
    surveys: Mutex<Vec<Coursesurvey>>,
}

impl CoursesurveyRepository for MemoryCoursesurveys {
    fn insert(&self, survey: Coursesurvey) -> Result<(), RepositoryError> {
        let mut surveys = guard(&self.surveys)?;
        let taken = surveys
            .iter()
            .any(|existing| existing.id == survey.id || existing.klass == survey.klass);
        if taken {
            return Err(RepositoryError::Conflict);
        }
        surveys.push(survey);
        Ok(())
    }

    fn update(&self, survey: Coursesurvey) -> Result<(), RepositoryError> {
        let mut surveys = guard(&self.surveys)?;
        match surveys.iter_mut().find(|existing| existing.id == survey.id) {
            Some(existing) => {
                *existing = survey;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn delete(&self, id: CoursesurveyId) -> Result<(), RepositoryError> {
        let mut surveys = guard(&self.surveys)?;
        let before = surveys.len();
        surveys.retain(|existing| existing.id != id);
        if surveys.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    fn fetch(&self, id: CoursesurveyId) -> Result<Option<Coursesurvey>, RepositoryError> {
        Ok(guard(&self.surveys)?
            .iter()
            .find(|existing| existing.id == id)
            .cloned())
    }

    fn for_klass(&self, klass: KlassId) -> Result<Option<Coursesurvey>, RepositoryError> {
        Ok(guard(&self.surveys)?
            .iter()
            .find(|existing| existing.klass == klass)
            .cloned())
    }

    fn all(&self) -> Result<Vec<Coursesurvey>, RepositoryError> {
        Ok(guard(&self.surveys)?.clone())
    }
}

#[derive(Default)]
pub struct MemorySurveyRecords {
    records: Mutex<Vec<SurveyRecord>>,
}

impl SurveyRecordRepository for MemorySurveyRecords {
    fn insert(&self, record: SurveyRecord) -> Result<(), RepositoryError> {
        guard(&self.records)?.push(record);
        Ok(())
    }

    fn all(&self) -> Result<Vec<SurveyRecord>, RepositoryError> {
        Ok(guard(&self.records)?.clone())
    }

    fn count(&self) -> Result<usize, RepositoryError> {
        Ok(guard(&self.records)?.len())
    }
}
