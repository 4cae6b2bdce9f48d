use crate::ipc::error::{err, ok};
use crate::ipc::helpers::required_f64;
use crate::ipc::types::{AppState, Request};
use gradecalcd::grade;
use serde_json::json;

/// Accepts either `percentage`, or `rawScore` with an optional `maxScore`.
fn request_percentage(req: &Request) -> Result<f64, serde_json::Value> {
    if req.params.get("percentage").is_some() {
        return required_f64(req, "percentage");
    }
    if req.params.get("rawScore").is_some() {
        let raw = required_f64(req, "rawScore")?;
        let max = match req.params.get("maxScore") {
            None => 100.0,
            Some(v) if v.is_null() => 100.0,
            Some(_) => required_f64(req, "maxScore")?,
        };
        return Ok(grade::percentage(raw, max));
    }
    Err(err(
        &req.id,
        "bad_params",
        "missing percentage or rawScore",
        None,
    ))
}

fn handle_grade_compute(state: &mut AppState, req: &Request) -> serde_json::Value {
    let percentage = match request_percentage(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let g = state.config.grade_table.grade(percentage);
    ok(
        &req.id,
        json!({
            "percentage": percentage,
            "letter": g.letter,
            "points": g.points,
            "label": g.label(),
        }),
    )
}

fn handle_grade_table(state: &mut AppState, req: &Request) -> serde_json::Value {
    let rows: Vec<serde_json::Value> = state
        .config
        .grade_table
        .rows()
        .iter()
        .map(|r| {
            json!({
                "letter": r.letter,
                "points": r.points,
                "minPercentage": r.min_percentage,
                "label": r.label(),
            })
        })
        .collect();
    ok(&req.id, json!({ "rows": rows }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "grade.compute" => Some(handle_grade_compute(state, req)),
        "grade.table" => Some(handle_grade_table(state, req)),
        _ => None,
    }
}
