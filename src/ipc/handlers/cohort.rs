use crate::ipc::error::ok;
use crate::ipc::helpers::{required_as, required_f64};
use crate::ipc::types::{AppState, Request};
use gradecalcd::cohort::{self, CourseScores};
use serde_json::json;

fn handle_cohort_aggregate(state: &mut AppState, req: &Request) -> serde_json::Value {
    let percentages: Vec<f64> = match required_as(req, "percentages") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let summary = cohort::aggregate(&percentages, &state.config.grade_table);
    ok(&req.id, json!(summary))
}

fn handle_cohort_aggregate_courses(state: &mut AppState, req: &Request) -> serde_json::Value {
    let courses: Vec<CourseScores> = match required_as(req, "courses") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let merged = cohort::aggregate_courses(&courses, &state.config.grade_table);
    ok(&req.id, json!(merged))
}

fn handle_cohort_percentile(_state: &mut AppState, req: &Request) -> serde_json::Value {
    let percentages: Vec<f64> = match required_as(req, "percentages") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let score = match required_f64(req, "score") {
        Ok(v) => v,
        Err(e) => return e,
    };
    ok(
        &req.id,
        json!({
            "score": score,
            "percentile": cohort::percentile_rank(&percentages, score),
            "sampleSize": percentages.len(),
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "cohort.aggregate" => Some(handle_cohort_aggregate(state, req)),
        "cohort.aggregateCourses" => Some(handle_cohort_aggregate_courses(state, req)),
        "cohort.percentile" => Some(handle_cohort_percentile(state, req)),
        _ => None,
    }
}
