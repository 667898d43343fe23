//! Loading, migrating and saving the roster document.
//!
//! The whole roster is one JSON document kept under a versioned key. Loading
//! never fails: anything unreadable degrades to the default roster.

use anyhow::Context;
use serde_json::Value;

use crate::model::{default_roster, new_id, Class, Roster, Student, SCHEMA_VERSION};

pub const STORAGE_KEY: &str = "random_caller_v2";
pub const LEGACY_STORAGE_KEY: &str = "random_caller_v1";

const FALLBACK_CLASS_NAME: &str = "Class";
const FALLBACK_STUDENT_NAME: &str = "Student";

/// Key/value persistence the roster document is written to.
pub trait Storage {
    fn get_item(&self, key: &str) -> anyhow::Result<Option<String>>;
    fn set_item(&mut self, key: &str, value: &str) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    Current,
    Legacy,
    Default,
}

#[derive(Debug, Clone)]
pub struct Loaded {
    pub roster: Roster,
    pub source: LoadSource,
}

pub fn load(storage: &dyn Storage) -> Loaded {
    if let Some(raw) = read_key(storage, STORAGE_KEY) {
        return Loaded {
            roster: parse_and_migrate(&raw, STORAGE_KEY),
            source: LoadSource::Current,
        };
    }
    if let Some(raw) = read_key(storage, LEGACY_STORAGE_KEY) {
        tracing::info!(key = LEGACY_STORAGE_KEY, "restoring roster from legacy key");
        return Loaded {
            roster: parse_and_migrate(&raw, LEGACY_STORAGE_KEY),
            source: LoadSource::Legacy,
        };
    }
    tracing::info!("no saved roster, starting with default classes");
    Loaded {
        roster: default_roster(),
        source: LoadSource::Default,
    }
}

pub fn save(storage: &mut dyn Storage, roster: &Roster) -> anyhow::Result<()> {
    let text = serde_json::to_string(roster).context("failed to serialize roster")?;
    storage
        .set_item(STORAGE_KEY, &text)
        .with_context(|| format!("failed to write {STORAGE_KEY}"))
}

/// Normalizes any decoded document to the current schema.
///
/// Version 1 documents are mapped over with round progress discarded.
/// Version 2 documents are backfilled field by field. Anything else is
/// replaced by the default roster.
pub fn migrate(parsed: Value) -> Roster {
    let Some(obj) = parsed.as_object() else {
        tracing::warn!("stored roster is not an object, using defaults");
        return default_roster();
    };
    let Some(classes) = obj.get("classes").and_then(Value::as_array) else {
        tracing::warn!("stored roster has no classes array, using defaults");
        return default_roster();
    };

    let keep_round = match obj.get("version").and_then(Value::as_f64) {
        Some(v) if v == 1.0 => false,
        Some(v) if v == f64::from(SCHEMA_VERSION) => true,
        other => {
            tracing::warn!(version = ?other, "unsupported roster version, using defaults");
            return default_roster();
        }
    };

    let classes: Vec<Class> = classes
        .iter()
        .filter_map(|c| class_from_value(c, keep_round))
        .collect();
    if classes.is_empty() {
        return default_roster();
    }
    Roster {
        version: SCHEMA_VERSION,
        classes,
    }
}

fn read_key(storage: &dyn Storage, key: &str) -> Option<String> {
    match storage.get_item(key) {
        Ok(Some(raw)) if !raw.is_empty() => Some(raw),
        Ok(_) => None,
        Err(e) => {
            tracing::warn!(key, error = %e, "failed to read stored roster");
            None
        }
    }
}

fn parse_and_migrate(raw: &str, key: &str) -> Roster {
    match serde_json::from_str::<Value>(raw) {
        Ok(v) => migrate(v),
        Err(e) => {
            tracing::warn!(key, error = %e, "stored roster is not valid JSON, using defaults");
            default_roster()
        }
    }
}

fn class_from_value(v: &Value, keep_round: bool) -> Option<Class> {
    let obj = v.as_object()?;
    let students = obj
        .get("students")
        .and_then(Value::as_array)
        .map(|list| {
            list.iter()
                .filter_map(|s| student_from_value(s, keep_round))
                .collect()
        })
        .unwrap_or_default();
    Some(Class {
        id: id_or_new(obj.get("id")),
        name: text_or(obj.get("name"), FALLBACK_CLASS_NAME),
        students,
    })
}

fn student_from_value(v: &Value, keep_round: bool) -> Option<Student> {
    let obj = v.as_object()?;
    let called_this_round = keep_round
        && obj
            .get("calledThisRound")
            .and_then(Value::as_bool)
            .unwrap_or(false);
    Some(Student {
        id: id_or_new(obj.get("id")),
        name: text_or(obj.get("name"), FALLBACK_STUDENT_NAME),
        correct: counter(obj.get("correct")),
        incorrect: counter(obj.get("incorrect")),
        called_this_round,
    })
}

fn id_or_new(v: Option<&Value>) -> String {
    match v {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => new_id(),
    }
}

fn text_or(v: Option<&Value>, fallback: &str) -> String {
    match v {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        _ => fallback.to_string(),
    }
}

/// Coerces a stored counter; anything that is not a non-negative number becomes 0.
fn counter(v: Option<&Value>) -> u64 {
    let as_float = match v {
        Some(Value::Number(n)) => {
            if let Some(u) = n.as_u64() {
                return u;
            }
            n.as_f64()
        }
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(Value::Bool(true)) => Some(1.0),
        _ => None,
    };
    match as_float {
        Some(f) if f.is_finite() && f > 0.0 => f as u64,
        _ => 0,
    }
}
