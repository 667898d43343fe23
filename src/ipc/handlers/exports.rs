use crate::export::{self, ExportKind};
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{param_str, require_session};
use crate::ipc::types::{AppState, Request};
use serde_json::json;
use std::path::PathBuf;

const EXPORT_DIR: &str = "exports";

/// Explicit `params.outPath`, else a date-stamped file under the workspace.
fn out_path(state: &AppState, req: &Request, kind: ExportKind) -> Option<PathBuf> {
    if let Some(p) = param_str(req, "outPath") {
        return Some(PathBuf::from(p));
    }
    let today = chrono::Local::now().date_naive();
    state
        .workspace
        .as_ref()
        .map(|ws| ws.join(EXPORT_DIR).join(export::default_file_name(kind, today)))
}

fn handle_export_csv(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(path) = out_path(state, req, ExportKind::Csv) else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let session = match require_session(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };

    let report = export::to_csv(session.roster());
    if let Err(e) = export::write_export(&path, &report.text) {
        return err(&req.id, "export_failed", format!("{e:#}"), None);
    }
    tracing::info!(path = %path.display(), rows = report.rows, "csv export written");
    ok(
        &req.id,
        json!({ "path": path.to_string_lossy(), "rows": report.rows }),
    )
}

fn handle_export_json(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(path) = out_path(state, req, ExportKind::Json) else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let session = match require_session(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };

    let written = export::to_json_backup(session.roster())
        .and_then(|text| export::write_export(&path, &text));
    if let Err(e) = written {
        return err(&req.id, "export_failed", format!("{e:#}"), None);
    }
    tracing::info!(path = %path.display(), "json backup written");
    ok(&req.id, json!({ "path": path.to_string_lossy() }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "export.csv" => Some(handle_export_csv(state, req)),
        "export.json" => Some(handle_export_json(state, req)),
        _ => None,
    }
}
