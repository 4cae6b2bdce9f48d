use crate::ipc::error::ok;
use crate::ipc::helpers::{records, required_as, semester_filter, students};
use crate::ipc::types::{AppState, Request};
use gradecalcd::records::{roster_from_records, ScoreRecord, StudentInfo};
use gradecalcd::reports::{self, ReportContext};
use serde_json::json;

pub(crate) fn report_context(state: &AppState) -> ReportContext<'_> {
    ReportContext {
        table: &state.config.grade_table,
        policy: state.config.cgpa_policy,
    }
}

/// Records plus a roster; the roster defaults to the students seen in the records.
pub(crate) fn records_and_roster(
    req: &Request,
) -> Result<(Vec<ScoreRecord>, Vec<StudentInfo>), serde_json::Value> {
    let records = records(req)?;
    let mut roster = students(req)?;
    if roster.is_empty() {
        roster = roster_from_records(&records);
    }
    Ok((records, roster))
}

fn handle_reports_student(state: &mut AppState, req: &Request) -> serde_json::Value {
    let student: StudentInfo = match required_as(req, "student") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let records = match records(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let filter = match semester_filter(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let report = reports::student_report(&report_context(state), &student, &records, filter);
    ok(&req.id, json!(report))
}

fn handle_reports_course_grades(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (records, roster) = match records_and_roster(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let sheet = reports::course_grade_sheet(&report_context(state), &roster, &records);
    ok(&req.id, json!(sheet))
}

fn handle_reports_batch_cgpa(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (records, roster) = match records_and_roster(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let sheet = reports::batch_cgpa_sheet(&report_context(state), &roster, &records);
    ok(&req.id, json!(sheet))
}

fn handle_reports_batch_averages(_state: &mut AppState, req: &Request) -> serde_json::Value {
    let records = match records(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    ok(
        &req.id,
        json!({ "averages": reports::batch_averages(&records) }),
    )
}

fn handle_reports_batch_performance(state: &mut AppState, req: &Request) -> serde_json::Value {
    let records = match records(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let perf = reports::batch_performance(&report_context(state), &records);
    ok(&req.id, json!(perf))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "reports.student" => Some(handle_reports_student(state, req)),
        "reports.courseGrades" => Some(handle_reports_course_grades(state, req)),
        "reports.batchCgpa" => Some(handle_reports_batch_cgpa(state, req)),
        "reports.batchAverages" => Some(handle_reports_batch_averages(state, req)),
        "reports.batchPerformance" => Some(handle_reports_batch_performance(state, req)),
        _ => None,
    }
}
