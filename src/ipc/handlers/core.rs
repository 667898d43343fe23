use crate::db::SqliteStorage;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{require_session, require_str};
use crate::ipc::types::{AppState, Request};
use crate::session::Session;
use serde_json::json;
use std::path::{Path, PathBuf};

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string())
        }),
    )
}

fn handle_workspace_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let path = match require_str(req, "path") {
        Ok(p) => PathBuf::from(p),
        Err(resp) => return resp,
    };

    match open_workspace(state, &path) {
        Ok(()) => ok(
            &req.id,
            json!({
                "workspacePath": path.to_string_lossy(),
                "currentClassId": state.session.as_ref().and_then(|s| s.current_class_id()),
            }),
        ),
        Err(e) => err(&req.id, "db_open_failed", format!("{e:#}"), None),
    }
}

fn handle_state_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let session = match require_session(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    ok(
        &req.id,
        json!({
            "roster": session.roster(),
            "currentClassId": session.current_class_id(),
            "selection": session.selection(),
            "selectedStudent": session.selected_student(),
        }),
    )
}

/// Opens (or creates) the workspace store and replaces the active session.
pub fn open_workspace(state: &mut AppState, path: &Path) -> anyhow::Result<()> {
    let storage = SqliteStorage::open(path)?;
    let session = Session::open(Box::new(storage), state.seed);
    state.workspace = Some(path.to_path_buf());
    state.session = Some(session);
    tracing::info!(workspace = %path.display(), "workspace selected");
    Ok(())
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        "state.get" => Some(handle_state_get(state, req)),
        _ => None,
    }
}
