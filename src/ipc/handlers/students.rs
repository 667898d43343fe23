use crate::ipc::error::{ok, session_err};
use crate::ipc::helpers::{param_str, require_session, require_str, target_class};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_students_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let session = match require_session(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let class_id = match target_class(session, req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let query = param_str(req, "query").unwrap_or("");

    match session.list_students(&class_id, query) {
        Ok(students) => ok(
            &req.id,
            json!({ "classId": class_id, "students": students }),
        ),
        Err(e) => session_err(&req.id, e),
    }
}

fn handle_students_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let session = match require_session(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let class_id = match target_class(session, req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let name = match require_str(req, "name") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match session.add_student(&class_id, name) {
        Ok(student_id) => {
            let name = session
                .roster()
                .class(&class_id)
                .and_then(|c| c.student(&student_id))
                .map(|s| s.name.clone())
                .unwrap_or_default();
            ok(&req.id, json!({ "studentId": student_id, "name": name }))
        }
        Err(e) => session_err(&req.id, e),
    }
}

fn handle_students_rename(state: &mut AppState, req: &Request) -> serde_json::Value {
    let session = match require_session(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let class_id = match target_class(session, req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let student_id = match require_str(req, "studentId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let name = match require_str(req, "name") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match session.rename_student(&class_id, student_id, name) {
        Ok(name) => ok(&req.id, json!({ "studentId": student_id, "name": name })),
        Err(e) => session_err(&req.id, e),
    }
}

fn handle_students_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let session = match require_session(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let class_id = match target_class(session, req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let student_id = match require_str(req, "studentId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match session.delete_student(&class_id, student_id) {
        Ok(cleared) => ok(&req.id, json!({ "selectionCleared": cleared })),
        Err(e) => session_err(&req.id, e),
    }
}

fn handle_students_bulk_import(state: &mut AppState, req: &Request) -> serde_json::Value {
    let session = match require_session(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let class_id = match target_class(session, req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let text = match require_str(req, "text") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match session.bulk_import(&class_id, text) {
        Ok(summary) => ok(
            &req.id,
            json!({
                "classId": class_id,
                "candidates": summary.candidates,
                "added": summary.added,
            }),
        ),
        Err(e) => session_err(&req.id, e),
    }
}

fn handle_students_reset_stats(state: &mut AppState, req: &Request) -> serde_json::Value {
    let session = match require_session(state, req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let class_id = match target_class(session, req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match session.reset_stats(&class_id) {
        Ok(()) => ok(&req.id, json!({ "classId": class_id })),
        Err(e) => session_err(&req.id, e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.list" => Some(handle_students_list(state, req)),
        "students.create" => Some(handle_students_create(state, req)),
        "students.rename" => Some(handle_students_rename(state, req)),
        "students.delete" => Some(handle_students_delete(state, req)),
        "students.bulkImport" => Some(handle_students_bulk_import(state, req)),
        "students.resetStats" => Some(handle_students_reset_stats(state, req)),
        _ => None,
    }
}
