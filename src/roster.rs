//! Class and student editing over an in-memory [`Roster`].
//!
//! Every function either applies its change completely or returns a
//! [`RosterError`] with the roster untouched. Persistence is the caller's job.

use crate::error::RosterError;
use crate::model::{default_roster, normalize_name, Class, Roster, Student};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    /// Names parsed out of the input text.
    pub candidates: usize,
    /// Students actually appended after skipping duplicates.
    pub added: usize,
}

pub fn add_class(roster: &mut Roster, name: &str) -> Result<String, RosterError> {
    let clean = normalize_name(name);
    if clean.is_empty() {
        return Err(RosterError::EmptyName);
    }
    let class = Class::new(clean);
    let id = class.id.clone();
    roster.classes.push(class);
    Ok(id)
}

/// Removes a class and its students. Returns `true` when that left the roster
/// empty and it was replaced by the default classes.
pub fn delete_class(roster: &mut Roster, class_id: &str) -> Result<bool, RosterError> {
    let before = roster.classes.len();
    roster.classes.retain(|c| c.id != class_id);
    if roster.classes.len() == before {
        return Err(RosterError::ClassNotFound(class_id.to_string()));
    }
    if roster.classes.is_empty() {
        *roster = default_roster();
        return Ok(true);
    }
    Ok(false)
}

pub fn add_student(roster: &mut Roster, class_id: &str, name: &str) -> Result<String, RosterError> {
    let class = find_class(roster, class_id)?;
    let clean = normalize_name(name);
    if clean.is_empty() {
        return Err(RosterError::EmptyName);
    }
    if class.has_name(&clean, None) {
        return Err(RosterError::DuplicateName(clean));
    }
    let student = Student::new(clean);
    let id = student.id.clone();
    class.students.push(student);
    Ok(id)
}

pub fn delete_student(
    roster: &mut Roster,
    class_id: &str,
    student_id: &str,
) -> Result<Student, RosterError> {
    let class = find_class(roster, class_id)?;
    let pos = class
        .students
        .iter()
        .position(|s| s.id == student_id)
        .ok_or_else(|| RosterError::StudentNotFound(student_id.to_string()))?;
    Ok(class.students.remove(pos))
}

/// Renames in place and returns the normalized name that was stored.
pub fn rename_student(
    roster: &mut Roster,
    class_id: &str,
    student_id: &str,
    new_name: &str,
) -> Result<String, RosterError> {
    let class = find_class(roster, class_id)?;
    if class.student(student_id).is_none() {
        return Err(RosterError::StudentNotFound(student_id.to_string()));
    }
    let clean = normalize_name(new_name);
    if clean.is_empty() {
        return Err(RosterError::EmptyName);
    }
    if class.has_name(&clean, Some(student_id)) {
        return Err(RosterError::DuplicateName(clean));
    }
    if let Some(student) = class.student_mut(student_id) {
        student.name = clean.clone();
    }
    Ok(clean)
}

pub fn bulk_import(
    roster: &mut Roster,
    class_id: &str,
    text: &str,
) -> Result<ImportSummary, RosterError> {
    let class = find_class(roster, class_id)?;
    let names = parse_bulk_input(text);
    let mut added = 0;
    for name in &names {
        // Checked against the live list, so repeats inside one batch are skipped too.
        if class.has_name(name, None) {
            continue;
        }
        class.students.push(Student::new(name.clone()));
        added += 1;
    }
    Ok(ImportSummary {
        candidates: names.len(),
        added,
    })
}

/// Zeroes correct/incorrect for every student; round flags are left alone.
pub fn reset_stats(roster: &mut Roster, class_id: &str) -> Result<usize, RosterError> {
    let class = find_class(roster, class_id)?;
    for s in class.students.iter_mut() {
        s.correct = 0;
        s.incorrect = 0;
    }
    Ok(class.students.len())
}

/// Turns pasted text into candidate names.
///
/// If any line has a comma the whole input is read as CSV and only the first
/// cell of each row is used; a first row whose first cell mentions "name" is
/// taken as a header. Otherwise each line is one name.
pub fn parse_bulk_input(text: &str) -> Vec<String> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    if lines.is_empty() {
        return Vec::new();
    }

    if !lines.iter().any(|l| l.contains(',')) {
        return lines
            .into_iter()
            .map(normalize_name)
            .filter(|n| !n.is_empty())
            .collect();
    }

    let first_cells: Vec<String> = lines
        .iter()
        .map(|l| l.split(',').next().map(clean_cell).unwrap_or_default())
        .collect();
    let skip = match first_cells.first() {
        Some(cell) if cell.to_lowercase().contains("name") => 1,
        _ => 0,
    };
    first_cells
        .into_iter()
        .skip(skip)
        .map(|c| normalize_name(&c))
        .filter(|n| !n.is_empty())
        .collect()
}

fn clean_cell(cell: &str) -> String {
    let t = cell.trim();
    let t = t.strip_prefix('"').unwrap_or(t);
    let t = t.strip_suffix('"').unwrap_or(t);
    t.trim().to_string()
}

fn find_class<'a>(roster: &'a mut Roster, class_id: &str) -> Result<&'a mut Class, RosterError> {
    roster
        .class_mut(class_id)
        .ok_or_else(|| RosterError::ClassNotFound(class_id.to_string()))
}
