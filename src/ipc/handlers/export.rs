use super::reports::{records_and_roster, report_context};
use crate::ipc::error::{calc_err, err, ok};
use crate::ipc::helpers::{optional_str, records, required_as, semester_filter};
use crate::ipc::types::{AppState, Request};
use gradecalcd::export::{self, CsvExport};
use gradecalcd::records::StudentInfo;
use gradecalcd::reports;
use serde_json::json;

fn student_grades(state: &AppState, req: &Request) -> Result<CsvExport, serde_json::Value> {
    let student: StudentInfo = required_as(req, "student")?;
    let records = records(req)?;
    let filter = semester_filter(req)?;
    let report = reports::student_report(&report_context(state), &student, &records, filter);
    export::student_grades_csv(&report).map_err(|e| calc_err(&req.id, e))
}

fn course_grades(state: &AppState, req: &Request) -> Result<CsvExport, serde_json::Value> {
    let (records, roster) = records_and_roster(req)?;
    let sheet = reports::course_grade_sheet(&report_context(state), &roster, &records);
    export::course_grades_csv(
        &sheet,
        &optional_str(req, "branch"),
        &optional_str(req, "batchYear"),
    )
    .map_err(|e| calc_err(&req.id, e))
}

fn batch_cgpa(state: &AppState, req: &Request) -> Result<CsvExport, serde_json::Value> {
    let (records, roster) = records_and_roster(req)?;
    let sheet = reports::batch_cgpa_sheet(&report_context(state), &roster, &records);
    export::batch_cgpa_csv(
        &sheet,
        &optional_str(req, "branch"),
        &optional_str(req, "batchYear"),
    )
    .map_err(|e| calc_err(&req.id, e))
}

fn handle_export_csv(state: &mut AppState, req: &Request) -> serde_json::Value {
    let kind = req
        .params
        .get("report")
        .and_then(|v| v.as_str())
        .unwrap_or("");
    let result = match kind {
        "studentGrades" => student_grades(state, req),
        "courseGrades" => course_grades(state, req),
        "batchCgpa" => batch_cgpa(state, req),
        other => {
            return err(
                &req.id,
                "bad_params",
                "report must be one of: studentGrades, courseGrades, batchCgpa",
                Some(json!({ "report": other })),
            )
        }
    };
    match result {
        Ok(out) => {
            tracing::debug!(report = kind, filename = %out.filename, bytes = out.csv.len(), "csv export");
            ok(
                &req.id,
                json!({
                    "filename": out.filename,
                    "contentType": out.content_type,
                    "csv": out.csv,
                }),
            )
        }
        Err(e) => e,
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "export.csv" => Some(handle_export_csv(state, req)),
        _ => None,
    }
}
