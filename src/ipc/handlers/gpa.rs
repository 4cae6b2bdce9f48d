use crate::ipc::error::ok;
use crate::ipc::helpers::{records, required_as, semester_filter};
use crate::ipc::types::{AppState, Request};
use gradecalcd::gpa::{self, WeightedPoints};
use serde_json::json;

fn handle_gpa_weighted(_state: &mut AppState, req: &Request) -> serde_json::Value {
    let entries: Vec<WeightedPoints> = match required_as(req, "entries") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let value = gpa::weighted_average(&entries).map(gpa::round2);
    ok(
        &req.id,
        json!({
            "value": value,
            "display": gpa::format_gpa(value),
        }),
    )
}

fn handle_gpa_academic(state: &mut AppState, req: &Request) -> serde_json::Value {
    let records = match records(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let filter = match semester_filter(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let academic = gpa::academic_record(
        &records,
        &state.config.grade_table,
        state.config.cgpa_policy,
        filter,
    );
    let cgpa_display = academic.cgpa.display();
    ok(
        &req.id,
        json!({
            "academic": academic,
            "cgpaDisplay": cgpa_display,
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "gpa.weighted" => Some(handle_gpa_weighted(state, req)),
        "gpa.academic" => Some(handle_gpa_academic(state, req)),
        _ => None,
    }
}
