use crate::ipc::error::{err, roster_err};
use crate::ipc::types::{AppState, Request};
use crate::session::Session;

pub fn param_str<'a>(req: &'a Request, key: &str) -> Option<&'a str> {
    req.params.get(key).and_then(|v| v.as_str())
}

pub fn require_str<'a>(req: &'a Request, key: &str) -> Result<&'a str, serde_json::Value> {
    param_str(req, key).ok_or_else(|| err(&req.id, "bad_params", format!("missing {key}"), None))
}

pub fn require_session<'a>(
    state: &'a mut AppState,
    req: &Request,
) -> Result<&'a mut Session, serde_json::Value> {
    state
        .session
        .as_mut()
        .ok_or_else(|| err(&req.id, "no_workspace", "select a workspace first", None))
}

/// `params.classId`, falling back to the session's active class.
pub fn target_class(session: &Session, req: &Request) -> Result<String, serde_json::Value> {
    session
        .resolve_class(param_str(req, "classId"))
        .map_err(|e| roster_err(&req.id, e))
}
