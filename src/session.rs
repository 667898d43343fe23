//! One user's working session: the roster, where it is stored, which class is
//! active and who was picked last.
//!
//! Every mutating call edits the in-memory roster and then writes the full
//! document back. Recoverable problems come back as [`SessionError::Roster`];
//! a failed write comes back as [`SessionError::Persist`] with the in-memory
//! change kept.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use crate::error::RosterError;
use crate::model::{Roster, Student};
use crate::roster::{self, ImportSummary};
use crate::scoring::{self, Tally};
use crate::selector::{self, RoundCounts, RoundState};
use crate::store::{self, LoadSource, Storage};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub class_id: String,
    pub student_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoundStatus {
    pub state: RoundState,
    #[serde(flatten)]
    pub counts: RoundCounts,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentView {
    pub id: String,
    pub name: String,
    pub called_this_round: bool,
    #[serde(flatten)]
    pub tally: Tally,
}

impl StudentView {
    fn of(s: &Student) -> Self {
        Self {
            id: s.id.clone(),
            name: s.name.clone(),
            called_this_round: s.called_this_round,
            tally: Tally::of(s),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassSummary {
    pub id: String,
    pub name: String,
    pub student_count: usize,
    pub round: RoundStatus,
}

#[derive(Debug)]
pub enum SessionError {
    Roster(RosterError),
    Persist(anyhow::Error),
}

impl From<RosterError> for SessionError {
    fn from(e: RosterError) -> Self {
        SessionError::Roster(e)
    }
}

pub type SessionResult<T> = Result<T, SessionError>;

pub struct Session {
    roster: Roster,
    storage: Box<dyn Storage>,
    current_class_id: Option<String>,
    selection: Option<Selection>,
    rng: StdRng,
}

impl Session {
    /// Loads the saved roster (or defaults) and makes the first class current.
    pub fn open(storage: Box<dyn Storage>, seed: Option<u64>) -> Self {
        let loaded = store::load(&*storage);
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        let mut session = Self {
            current_class_id: loaded.roster.classes.first().map(|c| c.id.clone()),
            roster: loaded.roster,
            storage,
            selection: None,
            rng,
        };
        if loaded.source == LoadSource::Legacy {
            match store::save(&mut *session.storage, &session.roster) {
                Ok(()) => tracing::info!("migrated legacy roster to {}", store::STORAGE_KEY),
                Err(e) => tracing::warn!(error = %e, "failed to persist migrated roster"),
            }
        }
        tracing::info!(
            classes = session.roster.classes.len(),
            source = ?loaded.source,
            "session opened"
        );
        session
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn current_class_id(&self) -> Option<&str> {
        self.current_class_id.as_deref()
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    /// The explicit class id, or the current class when none is given.
    pub fn resolve_class(&self, class_id: Option<&str>) -> Result<String, RosterError> {
        let id = class_id
            .or(self.current_class_id.as_deref())
            .ok_or_else(|| RosterError::ClassNotFound(String::new()))?;
        match self.roster.class(id) {
            Some(c) => Ok(c.id.clone()),
            None => Err(RosterError::ClassNotFound(id.to_string())),
        }
    }

    pub fn select_class(&mut self, class_id: &str) -> SessionResult<RoundStatus> {
        let status = self.round_status(class_id)?;
        if self
            .selection
            .as_ref()
            .is_some_and(|sel| sel.class_id != class_id)
        {
            self.selection = None;
        }
        self.current_class_id = Some(class_id.to_string());
        tracing::debug!(class_id, "active class switched");
        Ok(status)
    }

    pub fn class_summaries(&self) -> Vec<ClassSummary> {
        self.roster
            .classes
            .iter()
            .map(|c| ClassSummary {
                id: c.id.clone(),
                name: c.name.clone(),
                student_count: c.students.len(),
                round: RoundStatus {
                    state: selector::round_state(c),
                    counts: selector::round_counts(c),
                },
            })
            .collect()
    }

    /// Students of a class whose name contains `query` (case-insensitive),
    /// sorted by name.
    pub fn list_students(&self, class_id: &str, query: &str) -> SessionResult<Vec<StudentView>> {
        let class = self
            .roster
            .class(class_id)
            .ok_or_else(|| RosterError::ClassNotFound(class_id.to_string()))?;
        let q = query.trim().to_lowercase();
        let mut out: Vec<StudentView> = class
            .students
            .iter()
            .filter(|s| q.is_empty() || s.name.to_lowercase().contains(&q))
            .map(StudentView::of)
            .collect();
        out.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(out)
    }

    pub fn selected_student(&self) -> Option<StudentView> {
        let sel = self.selection.as_ref()?;
        self.roster
            .class(&sel.class_id)
            .and_then(|c| c.student(&sel.student_id))
            .map(StudentView::of)
    }

    pub fn round_status(&self, class_id: &str) -> SessionResult<RoundStatus> {
        let class = self
            .roster
            .class(class_id)
            .ok_or_else(|| RosterError::ClassNotFound(class_id.to_string()))?;
        Ok(RoundStatus {
            state: selector::round_state(class),
            counts: selector::round_counts(class),
        })
    }

    pub fn add_class(&mut self, name: &str) -> SessionResult<String> {
        let id = roster::add_class(&mut self.roster, name)?;
        self.selection = None;
        self.persist()?;
        tracing::info!(class_id = %id, "class added");
        Ok(id)
    }

    /// Returns `true` when the roster was reset to the default classes.
    pub fn delete_class(&mut self, class_id: &str) -> SessionResult<bool> {
        let reset = roster::delete_class(&mut self.roster, class_id)?;
        let current_gone = self
            .current_class_id
            .as_deref()
            .map_or(true, |id| self.roster.class(id).is_none());
        if current_gone {
            self.current_class_id = self.roster.classes.first().map(|c| c.id.clone());
        }
        self.selection = None;
        self.persist()?;
        tracing::info!(class_id, reset, "class deleted");
        Ok(reset)
    }

    pub fn add_student(&mut self, class_id: &str, name: &str) -> SessionResult<String> {
        let id = roster::add_student(&mut self.roster, class_id, name)?;
        self.persist()?;
        tracing::info!(class_id, student_id = %id, "student added");
        Ok(id)
    }

    /// Returns `true` when the deleted student was the current selection.
    pub fn delete_student(&mut self, class_id: &str, student_id: &str) -> SessionResult<bool> {
        roster::delete_student(&mut self.roster, class_id, student_id)?;
        let cleared = self
            .selection
            .as_ref()
            .is_some_and(|sel| sel.student_id == student_id);
        if cleared {
            self.selection = None;
        }
        self.persist()?;
        tracing::info!(class_id, student_id, cleared, "student deleted");
        Ok(cleared)
    }

    pub fn rename_student(
        &mut self,
        class_id: &str,
        student_id: &str,
        new_name: &str,
    ) -> SessionResult<String> {
        let name = roster::rename_student(&mut self.roster, class_id, student_id, new_name)?;
        self.persist()?;
        tracing::info!(class_id, student_id, "student renamed");
        Ok(name)
    }

    pub fn bulk_import(&mut self, class_id: &str, text: &str) -> SessionResult<ImportSummary> {
        let summary = roster::bulk_import(&mut self.roster, class_id, text)?;
        if summary.added > 0 {
            self.persist()?;
        }
        tracing::info!(
            class_id,
            candidates = summary.candidates,
            added = summary.added,
            "bulk import"
        );
        Ok(summary)
    }

    pub fn reset_stats(&mut self, class_id: &str) -> SessionResult<()> {
        roster::reset_stats(&mut self.roster, class_id)?;
        self.selection = None;
        self.persist()?;
        tracing::info!(class_id, "stats reset");
        Ok(())
    }

    /// Calls on the next student and makes their class the active one.
    pub fn pick_next(&mut self, class_id: &str) -> SessionResult<StudentView> {
        let class = self
            .roster
            .class_mut(class_id)
            .ok_or_else(|| RosterError::ClassNotFound(class_id.to_string()))?;
        let student_id = selector::pick_next(class, &mut self.rng)?;
        let view = class
            .student(&student_id)
            .map(StudentView::of)
            .ok_or_else(|| RosterError::StudentNotFound(student_id.clone()))?;
        self.current_class_id = Some(class_id.to_string());
        self.selection = Some(Selection {
            class_id: class_id.to_string(),
            student_id,
        });
        self.persist()?;
        tracing::info!(class_id, student_id = %view.id, "student picked");
        Ok(view)
    }

    pub fn start_new_round(&mut self, class_id: &str) -> SessionResult<RoundStatus> {
        let class = self
            .roster
            .class_mut(class_id)
            .ok_or_else(|| RosterError::ClassNotFound(class_id.to_string()))?;
        let state = selector::start_new_round(class);
        let counts = selector::round_counts(class);
        self.selection = None;
        self.persist()?;
        tracing::info!(class_id, ?state, "new round started");
        Ok(RoundStatus { state, counts })
    }

    pub fn mark_selected(&mut self, is_correct: bool) -> SessionResult<StudentView> {
        let sel = self.selection.clone().ok_or(RosterError::NoSelection)?;
        let student = self
            .roster
            .class_mut(&sel.class_id)
            .and_then(|c| c.student_mut(&sel.student_id));
        if student.is_none() {
            self.selection = None;
        }
        let student = student.ok_or(RosterError::NoSelection)?;
        scoring::mark_selected(Some(&mut *student), is_correct)?;
        let view = StudentView::of(student);
        self.persist()?;
        tracing::info!(student_id = %sel.student_id, is_correct, "answer marked");
        Ok(view)
    }

    fn persist(&mut self) -> SessionResult<()> {
        store::save(&mut *self.storage, &self.roster).map_err(|e| {
            tracing::warn!(error = %e, "failed to persist roster");
            SessionError::Persist(e)
        })
    }
}
