//! Fair round-robin picking: nobody is called twice until everyone in the
//! class has been called once. Round state lives entirely in each student's
//! `called_this_round` flag, so every class keeps its own round.

use rand::Rng;
use serde::Serialize;

use crate::error::RosterError;
use crate::model::Class;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RoundState {
    /// Class has no students; picking is disabled.
    Idle,
    InProgress,
    RoundComplete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoundCounts {
    pub called: usize,
    pub total: usize,
    pub remaining: usize,
}

pub fn round_counts(class: &Class) -> RoundCounts {
    let total = class.students.len();
    let called = class.students.iter().filter(|s| s.called_this_round).count();
    RoundCounts {
        called,
        total,
        remaining: total - called,
    }
}

pub fn round_state(class: &Class) -> RoundState {
    let counts = round_counts(class);
    if counts.total == 0 {
        RoundState::Idle
    } else if counts.remaining == 0 {
        RoundState::RoundComplete
    } else {
        RoundState::InProgress
    }
}

/// Picks one not-yet-called student uniformly at random, marks them called and
/// returns their id.
pub fn pick_next<R: Rng>(class: &mut Class, rng: &mut R) -> Result<String, RosterError> {
    match round_state(class) {
        RoundState::Idle => return Err(RosterError::NoStudents),
        RoundState::RoundComplete => return Err(RosterError::RoundComplete),
        RoundState::InProgress => {}
    }

    let mut eligible: Vec<_> = class
        .students
        .iter_mut()
        .filter(|s| !s.called_this_round)
        .collect();
    let idx = rng.gen_range(0..eligible.len());
    let student = eligible.swap_remove(idx);
    student.called_this_round = true;
    Ok(student.id.clone())
}

/// Clears every round flag in the class. Never triggered automatically.
pub fn start_new_round(class: &mut Class) -> RoundState {
    for s in class.students.iter_mut() {
        s.called_this_round = false;
    }
    round_state(class)
}
