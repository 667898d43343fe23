use crate::ipc::error::{err, ok, session_err};
use crate::ipc::helpers::{require_session, target_class};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_round_status(state: &mut AppState, req: &Request) -> serde_json::Value {
    let session = match require_session(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let class_id = match target_class(session, req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match session.round_status(&class_id) {
        Ok(round) => ok(&req.id, json!(round)),
        Err(e) => session_err(&req.id, e),
    }
}

fn handle_round_pick(state: &mut AppState, req: &Request) -> serde_json::Value {
    let session = match require_session(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let class_id = match target_class(session, req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let student = match session.pick_next(&class_id) {
        Ok(v) => v,
        Err(e) => return session_err(&req.id, e),
    };
    match session.round_status(&class_id) {
        Ok(round) => ok(&req.id, json!({ "student": student, "round": round })),
        Err(e) => session_err(&req.id, e),
    }
}

fn handle_round_start(state: &mut AppState, req: &Request) -> serde_json::Value {
    let session = match require_session(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let class_id = match target_class(session, req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match session.start_new_round(&class_id) {
        Ok(round) => ok(&req.id, json!({ "classId": class_id, "round": round })),
        Err(e) => session_err(&req.id, e),
    }
}

fn handle_score_mark(state: &mut AppState, req: &Request) -> serde_json::Value {
    let session = match require_session(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let Some(correct) = req.params.get("correct").and_then(|v| v.as_bool()) else {
        return err(&req.id, "bad_params", "missing correct", None);
    };

    match session.mark_selected(correct) {
        Ok(student) => ok(&req.id, json!({ "student": student })),
        Err(e) => session_err(&req.id, e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "round.status" => Some(handle_round_status(state, req)),
        "round.pick" => Some(handle_round_pick(state, req)),
        "round.start" => Some(handle_round_start(state, req)),
        "score.mark" => Some(handle_score_mark(state, req)),
        _ => None,
    }
}
