use thiserror::Error;

/// Recoverable notices raised by roster, round and scoring operations.
///
/// None of these are fatal: the roster is left exactly as it was and the
/// presentation layer shows the message as a transient notice.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RosterError {
    /// Name was empty after whitespace normalization.
    #[error("name must not be empty")]
    EmptyName,

    /// Another student in the class already has this name (case-insensitive).
    #[error("a student named \"{0}\" already exists in this class")]
    DuplicateName(String),

    #[error("class not found: {0}")]
    ClassNotFound(String),

    #[error("student not found: {0}")]
    StudentNotFound(String),

    #[error("no students in this class")]
    NoStudents,

    /// Every student has been called; a new round must be started manually.
    #[error("round complete, start a new round")]
    RoundComplete,

    #[error("no student is currently selected")]
    NoSelection,
}

impl RosterError {
    pub fn code(&self) -> &'static str {
        match self {
            RosterError::EmptyName => "empty_name",
            RosterError::DuplicateName(_) => "duplicate_name",
            RosterError::ClassNotFound(_) => "class_not_found",
            RosterError::StudentNotFound(_) => "student_not_found",
            RosterError::NoStudents => "no_students",
            RosterError::RoundComplete => "round_complete",
            RosterError::NoSelection => "no_selection",
        }
    }
}
