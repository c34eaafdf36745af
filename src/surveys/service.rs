use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use super::domain::{Coursesurvey, CoursesurveyId, CoursesurveyUpdate, Klass, KlassId};
use super::repository::{CoursesurveyRepository, KlassCatalog};
use crate::config::PropertiesHandle;
use crate::semester::Semester;
use crate::store::RepositoryError;

static COURSESURVEY_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_coursesurvey_id() -> CoursesurveyId {
    CoursesurveyId(COURSESURVEY_SEQUENCE.fetch_add(1, Ordering::Relaxed))
}

/// A current-semester course offering with its survey state, as shown on the
/// class-selection screen.
#[derive(Debug, Clone, Serialize)]
pub struct ClassRow {
    pub klass: Klass,
    pub survey: Option<Coursesurvey>,
}

/// What a selection pass changed.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct SelectionOutcome {
    pub created: usize,
    pub removed: usize,
}

/// Error raised while applying coursesurvey updates.
#[derive(Debug, thiserror::Error)]
pub enum ManageError {
    #[error("coursesurvey {0:?} does not exist")]
    UnknownSurvey(CoursesurveyId),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Administers which current-semester classes are surveyed and the survey
/// records' editable state.
pub struct SurveyAdmin<K, C> {
    klasses: Arc<K>,
    surveys: Arc<C>,
    properties: PropertiesHandle,
}

impl<K, C> SurveyAdmin<K, C>
where
    K: KlassCatalog + 'static,
    C: CoursesurveyRepository + 'static,
{
    pub fn new(klasses: Arc<K>, surveys: Arc<C>, properties: PropertiesHandle) -> Self {
        Self {
            klasses,
            surveys,
            properties,
        }
    }

    pub fn current_semester(&self) -> Semester {
        self.properties.get().semester
    }

    pub fn coursesurveys_active(&self) -> bool {
        self.properties.get().coursesurveys_active
    }

    /// Current-semester offerings with their survey state, ordered by course
    /// then section.
    pub fn class_rows(&self) -> Result<Vec<ClassRow>, RepositoryError> {
        let mut klasses = self.klasses.for_semester(self.current_semester())?;
        klasses.sort_by(|a, b| a.course.cmp(&b.course).then(a.section.cmp(&b.section)));

        klasses
            .into_iter()
            .map(|klass| {
                let survey = self.surveys.for_klass(klass.id)?;
                Ok(ClassRow { klass, survey })
            })
            .collect()
    }

    /// Bring survey state in line with the selection: create a coursesurvey
    /// for each selected class without one, delete the coursesurvey of each
    /// deselected class, then update the active flag.
    pub fn select_classes(
        &self,
        selected: &HashSet<KlassId>,
        coursesurveys_active: bool,
    ) -> Result<SelectionOutcome, RepositoryError> {
        let mut outcome = SelectionOutcome::default();

        for klass in self.klasses.for_semester(self.current_semester())? {
            let existing = self.surveys.for_klass(klass.id)?;
            match (selected.contains(&klass.id), existing) {
                (true, None) => {
                    self.surveys.insert(Coursesurvey {
                        id: next_coursesurvey_id(),
                        klass: klass.id,
                        published: false,
                        deadline: None,
                    })?;
                    outcome.created += 1;
                }
                (false, Some(survey)) => {
                    self.surveys.delete(survey.id)?;
                    outcome.removed += 1;
                }
                _ => {}
            }
        }

        self.properties.set_coursesurveys_active(coursesurveys_active);
        info!(
            created = outcome.created,
            removed = outcome.removed,
            active = coursesurveys_active,
            "surveyed classes updated"
        );
        Ok(outcome)
    }

    /// Apply a batch of typed updates. Every target is checked before
    /// anything is written, so an unknown id fails the whole batch.
    pub fn manage_classes(&self, updates: &[CoursesurveyUpdate]) -> Result<usize, ManageError> {
        let mut staged = Vec::with_capacity(updates.len());
        for update in updates {
            let current = self
                .surveys
                .fetch(update.id)?
                .ok_or(ManageError::UnknownSurvey(update.id))?;
            staged.push((current, update));
        }

        let applied = staged.len();
        for (mut survey, update) in staged {
            if let Some(published) = update.published {
                survey.published = published;
            }
            if let Some(deadline) = update.deadline {
                survey.deadline = Some(deadline);
            }
            self.surveys.update(survey)?;
        }

        Ok(applied)
    }
}
