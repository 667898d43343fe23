use crate::ipc::error::{ok, session_err};
use crate::ipc::helpers::{require_session, require_str};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_classes_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(session) = state.session.as_ref() else {
        return ok(&req.id, json!({ "classes": [] }));
    };
    ok(
        &req.id,
        json!({
            "classes": session.class_summaries(),
            "currentClassId": session.current_class_id(),
        }),
    )
}

fn handle_classes_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let session = match require_session(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let name = match require_str(req, "name") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match session.add_class(name) {
        Ok(class_id) => {
            let name = session
                .roster()
                .class(&class_id)
                .map(|c| c.name.clone())
                .unwrap_or_default();
            ok(&req.id, json!({ "classId": class_id, "name": name }))
        }
        Err(e) => session_err(&req.id, e),
    }
}

fn handle_classes_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let session = match require_session(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let class_id = match require_str(req, "classId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match session.delete_class(class_id) {
        Ok(reset) => ok(
            &req.id,
            json!({
                "currentClassId": session.current_class_id(),
                "resetToDefault": reset,
            }),
        ),
        Err(e) => session_err(&req.id, e),
    }
}

fn handle_classes_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let session = match require_session(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let class_id = match require_str(req, "classId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match session.select_class(class_id) {
        Ok(round) => ok(
            &req.id,
            json!({ "currentClassId": class_id, "round": round }),
        ),
        Err(e) => session_err(&req.id, e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "classes.list" => Some(handle_classes_list(state, req)),
        "classes.create" => Some(handle_classes_create(state, req)),
        "classes.delete" => Some(handle_classes_delete(state, req)),
        "classes.select" => Some(handle_classes_select(state, req)),
        _ => None,
    }
}
