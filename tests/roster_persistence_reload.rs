use rusqlite::{Connection, OptionalExtension};
use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_rollcalld");
    let mut child = Command::new(exe)
        .args(["--seed", "17"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn rollcalld");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response for {}", method);
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

fn select_workspace(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    workspace: &Path,
) -> serde_json::Value {
    request_ok(
        stdin,
        reader,
        "ws",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    )
}

fn seed_store(workspace: &Path, key: &str, value: &str) {
    let conn = Connection::open(workspace.join("rollcall.sqlite3")).expect("open sqlite");
    conn.execute(
        "CREATE TABLE IF NOT EXISTS kv_store(key TEXT PRIMARY KEY, value TEXT NOT NULL, updated_at TEXT)",
        [],
    )
    .expect("create kv_store");
    conn.execute(
        "INSERT INTO kv_store(key, value) VALUES(?, ?)",
        (key, value),
    )
    .expect("insert seed");
}

fn stored_value(workspace: &Path, key: &str) -> Option<String> {
    let conn = Connection::open(workspace.join("rollcall.sqlite3")).expect("open sqlite");
    conn.query_row("SELECT value FROM kv_store WHERE key = ?", [key], |row| {
        row.get::<_, String>(0)
    })
    .optional()
    .expect("query kv_store")
}

#[test]
fn roster_survives_restart() {
    let workspace = temp_dir("rollcall-restart");

    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let selected = select_workspace(&mut stdin, &mut reader, &workspace);
    let class_id = selected["currentClassId"].as_str().expect("class").to_string();
    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "students.bulkImport",
        json!({ "classId": class_id, "text": "Ada\nGrace" }),
    );
    let picked = request_ok(&mut stdin, &mut reader, "2", "round.pick", json!({}));
    let picked_id = picked["student"]["id"].as_str().expect("picked id").to_string();
    request_ok(&mut stdin, &mut reader, "3", "score.mark", json!({ "correct": false }));
    drop(stdin);
    let _ = child.wait();

    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    select_workspace(&mut stdin, &mut reader, &workspace);
    let state = request_ok(&mut stdin, &mut reader, "4", "state.get", json!({}));
    let students = state["roster"]["classes"][0]["students"]
        .as_array()
        .expect("students");
    assert_eq!(students.len(), 2);
    let picked = students
        .iter()
        .find(|s| s["id"] == json!(picked_id))
        .expect("picked student persisted");
    assert_eq!(picked["incorrect"], json!(1));
    assert_eq!(picked["calledThisRound"], json!(true));
    // Selection is session state, not persisted.
    assert!(state["selection"].is_null());

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn legacy_document_is_migrated_and_rewritten() {
    let workspace = temp_dir("rollcall-legacy");
    seed_store(
        &workspace,
        "random_caller_v1",
        &json!({
            "version": 1,
            "classes": [{
                "id": "legacy-class",
                "name": "Period 2",
                "students": [
                    { "id": "s1", "name": "Ada", "correct": 3, "incorrect": "2", "calledThisRound": true },
                    { "name": "Grace" }
                ]
            }]
        })
        .to_string(),
    );

    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let selected = select_workspace(&mut stdin, &mut reader, &workspace);
    assert_eq!(selected["currentClassId"], json!("legacy-class"));

    let listed = request_ok(&mut stdin, &mut reader, "1", "students.list", json!({}));
    let students = listed["students"].as_array().expect("students");
    assert_eq!(students.len(), 2);
    assert_eq!(students[0]["name"], json!("Ada"));
    assert_eq!(students[0]["correct"], json!(3));
    assert_eq!(students[0]["incorrect"], json!(2));
    assert_eq!(students[0]["calledThisRound"], json!(false));
    assert_eq!(students[1]["correct"], json!(0));

    drop(stdin);
    let _ = child.wait();

    let current = stored_value(&workspace, "random_caller_v2").expect("rewritten under v2 key");
    let doc: serde_json::Value = serde_json::from_str(&current).expect("stored json");
    assert_eq!(doc["version"], json!(2));
    assert_eq!(doc["classes"][0]["name"], json!("Period 2"));

    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn corrupt_document_falls_back_to_defaults() {
    let workspace = temp_dir("rollcall-corrupt");
    seed_store(&workspace, "random_caller_v2", "{\"version\": 2, \"classes\": [");

    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    select_workspace(&mut stdin, &mut reader, &workspace);
    let listed = request_ok(&mut stdin, &mut reader, "1", "classes.list", json!({}));
    let names: Vec<&str> = listed["classes"]
        .as_array()
        .expect("classes")
        .iter()
        .filter_map(|c| c["name"].as_str())
        .collect();
    assert_eq!(names, vec!["Class 1", "Class 2", "Class 3"]);

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn startup_workspace_flag_opens_store() {
    let workspace = temp_dir("rollcall-startup-flag");
    let exe = env!("CARGO_BIN_EXE_rollcalld");
    let mut child = Command::new(exe)
        .arg("--workspace")
        .arg(&workspace)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn rollcalld");
    let mut stdin = child.stdin.take().expect("child stdin");
    let mut reader = BufReader::new(child.stdout.take().expect("child stdout"));

    let health = request_ok(&mut stdin, &mut reader, "1", "health", json!({}));
    assert_eq!(
        health["workspacePath"],
        json!(workspace.to_string_lossy())
    );
    let state = request_ok(&mut stdin, &mut reader, "2", "state.get", json!({}));
    assert_eq!(state["roster"]["version"], json!(2));

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn fresh_store_stamps_updated_at() {
    let workspace = temp_dir("rollcall-stamp");

    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let selected = select_workspace(&mut stdin, &mut reader, &workspace);
    let class_id = selected["currentClassId"].as_str().expect("class").to_string();
    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "students.create",
        json!({ "classId": class_id, "name": "Ada" }),
    );
    drop(stdin);
    let _ = child.wait();

    let conn = Connection::open(workspace.join("rollcall.sqlite3")).expect("open sqlite");
    let stamp: Option<String> = conn
        .query_row(
            "SELECT updated_at FROM kv_store WHERE key = ?",
            ["random_caller_v2"],
            |row| row.get(0),
        )
        .expect("query updated_at");
    let stamp = stamp.expect("updated_at set");
    assert!(looks_like_rfc3339(&stamp), "unexpected timestamp {stamp}");

    drop(conn);
    let _ = std::fs::remove_dir_all(workspace);
}

fn looks_like_rfc3339(stamp: &str) -> bool {
    stamp.len() >= 20 && stamp.as_bytes()[4] == b'-' && stamp.contains('T')
}
