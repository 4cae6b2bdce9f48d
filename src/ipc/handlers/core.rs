use crate::ipc::error::{calc_err, ok};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn config_json(state: &AppState) -> serde_json::Value {
    json!({
        "gradeTable": state.config.grade_table,
        "cgpaPolicy": state.config.cgpa_policy,
    })
}

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "startedAt": state.started_at.to_rfc3339(),
            "gradeTableSize": state.config.grade_table.len(),
            "cgpaPolicy": state.config.cgpa_policy.as_str(),
        }),
    )
}

fn handle_config_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(&req.id, config_json(state))
}

fn handle_config_set(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(e) = state.config.apply_patch(&req.params) {
        return calc_err(&req.id, e);
    }
    tracing::info!(
        grade_rows = state.config.grade_table.len(),
        cgpa_policy = state.config.cgpa_policy.as_str(),
        "config updated"
    );
    ok(&req.id, config_json(state))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "config.get" => Some(handle_config_get(state, req)),
        "config.set" => Some(handle_config_set(state, req)),
        _ => None,
    }
}
