use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const SCHEMA_VERSION: u32 = 2;

const DEFAULT_CLASS_NAMES: [&str; 3] = ["Class 1", "Class 2", "Class 3"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    pub version: u32,
    pub classes: Vec<Class>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Class {
    pub id: String,
    pub name: String,
    pub students: Vec<Student>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    pub correct: u64,
    pub incorrect: u64,
    pub called_this_round: bool,
}

impl Roster {
    pub fn class(&self, class_id: &str) -> Option<&Class> {
        self.classes.iter().find(|c| c.id == class_id)
    }

    pub fn class_mut(&mut self, class_id: &str) -> Option<&mut Class> {
        self.classes.iter_mut().find(|c| c.id == class_id)
    }
}

impl Class {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            students: Vec::new(),
        }
    }

    pub fn student(&self, student_id: &str) -> Option<&Student> {
        self.students.iter().find(|s| s.id == student_id)
    }

    pub fn student_mut(&mut self, student_id: &str) -> Option<&mut Student> {
        self.students.iter_mut().find(|s| s.id == student_id)
    }

    /// Case-insensitive name lookup, optionally ignoring one student (rename).
    pub fn has_name(&self, name: &str, except: Option<&str>) -> bool {
        let wanted = name.to_lowercase();
        self.students
            .iter()
            .filter(|s| Some(s.id.as_str()) != except)
            .any(|s| s.name.to_lowercase() == wanted)
    }
}

impl Student {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            correct: 0,
            incorrect: 0,
            called_this_round: false,
        }
    }
}

/// First-run roster: three empty classes.
pub fn default_roster() -> Roster {
    Roster {
        version: SCHEMA_VERSION,
        classes: DEFAULT_CLASS_NAMES.iter().map(|n| Class::new(*n)).collect(),
    }
}

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Collapse runs of whitespace to a single space and trim both ends.
pub fn normalize_name(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_internal_whitespace() {
        assert_eq!(normalize_name("  Ada \t  Lovelace\n"), "Ada Lovelace");
        assert_eq!(normalize_name(" \t \n"), "");
    }

    #[test]
    fn default_roster_has_three_empty_classes() {
        let r = default_roster();
        assert_eq!(r.version, SCHEMA_VERSION);
        let names: Vec<_> = r.classes.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Class 1", "Class 2", "Class 3"]);
        assert!(r.classes.iter().all(|c| c.students.is_empty()));
        assert_ne!(r.classes[0].id, r.classes[1].id);
    }

    #[test]
    fn student_serializes_with_camel_case_round_flag() {
        let s = Student {
            id: "s1".into(),
            name: "Ada".into(),
            correct: 2,
            incorrect: 1,
            called_this_round: true,
        };
        let v = serde_json::to_value(&s).expect("serialize");
        assert_eq!(v["calledThisRound"], serde_json::json!(true));
        assert_eq!(v["correct"], serde_json::json!(2));
    }
}
