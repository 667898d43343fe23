//! Read-only exports of the roster: a per-student CSV report and a JSON
//! backup identical to the stored document.

use anyhow::Context;
use chrono::NaiveDate;
use std::path::Path;

use crate::model::{Roster, Student};
use crate::scoring::Tally;

pub const CSV_HEADER: &str = "Class,Student,Correct,Incorrect,Total,Accuracy";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Csv,
    Json,
}

#[derive(Debug, Clone)]
pub struct CsvReport {
    pub text: String,
    pub rows: usize,
}

/// One row per student, classes in roster order, students by name.
pub fn to_csv(roster: &Roster) -> CsvReport {
    let mut lines = vec![CSV_HEADER.to_string()];
    for class in &roster.classes {
        let mut students: Vec<&Student> = class.students.iter().collect();
        students.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.name.cmp(&b.name))
        });
        for s in students {
            let tally = Tally::of(s);
            let accuracy = tally
                .accuracy
                .map(|a| format!("{a:.4}"))
                .unwrap_or_default();
            lines.push(format!(
                "{},{},{},{},{},{}",
                csv_cell(&class.name),
                csv_cell(&s.name),
                tally.correct,
                tally.incorrect,
                tally.total,
                accuracy
            ));
        }
    }
    CsvReport {
        rows: lines.len() - 1,
        text: lines.join("\n"),
    }
}

pub fn to_json_backup(roster: &Roster) -> anyhow::Result<String> {
    serde_json::to_string_pretty(roster).context("failed to serialize roster backup")
}

pub fn default_file_name(kind: ExportKind, date: NaiveDate) -> String {
    let stamp = date.format("%Y-%m-%d");
    match kind {
        ExportKind::Csv => format!("random-caller-export-{stamp}.csv"),
        ExportKind::Json => format!("random-caller-backup-{stamp}.json"),
    }
}

pub fn write_export(out_path: &Path, contents: &str) -> anyhow::Result<()> {
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.to_string_lossy()))?;
    }
    std::fs::write(out_path, contents)
        .with_context(|| format!("failed to write {}", out_path.to_string_lossy()))
}

fn csv_cell(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
