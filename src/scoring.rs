use serde::Serialize;

use crate::error::RosterError;
use crate::model::Student;

/// Derived answer statistics for one student.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tally {
    pub correct: u64,
    pub incorrect: u64,
    pub total: u64,
    /// `correct / total`, absent while nothing has been answered.
    pub accuracy: Option<f64>,
    /// Accuracy as a whole percentage for display.
    pub accuracy_percent: Option<u64>,
}

impl Tally {
    pub fn of(student: &Student) -> Self {
        let total = student.correct.saturating_add(student.incorrect);
        let accuracy = (total > 0).then(|| student.correct as f64 / total as f64);
        Self {
            correct: student.correct,
            incorrect: student.incorrect,
            total,
            accuracy,
            accuracy_percent: accuracy.map(|a| (a * 100.0).round() as u64),
        }
    }
}

/// Records one answer for the currently selected student. Round flags are
/// not touched.
pub fn mark_selected(selected: Option<&mut Student>, is_correct: bool) -> Result<Tally, RosterError> {
    let student = selected.ok_or(RosterError::NoSelection)?;
    if is_correct {
        student.correct = student.correct.saturating_add(1);
    } else {
        student.incorrect = student.incorrect.saturating_add(1);
    }
    Ok(Tally::of(student))
}
