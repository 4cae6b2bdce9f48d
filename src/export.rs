use crate::error::CalcError;
use crate::gpa::format_gpa;
use crate::reports::{BatchCgpaSheet, CourseGradeSheet, StudentReport};

pub const CSV_CONTENT_TYPE: &str = "text/csv";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    pub filename: String,
    pub content_type: &'static str,
    pub csv: String,
}

fn write_csv(header: &[&str], rows: Vec<Vec<String>>) -> Result<String, CalcError> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(header)
        .map_err(|e| CalcError::new("export_failed", e.to_string()))?;
    for row in rows {
        wtr.write_record(&row)
            .map_err(|e| CalcError::new("export_failed", e.to_string()))?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| CalcError::new("export_failed", e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| CalcError::new("export_failed", e.to_string()))
}

/// `stem_part1_part2.csv`, skipping empty parts and keeping file names tame.
pub fn export_filename(stem: &str, parts: &[&str]) -> String {
    let mut name = stem.to_string();
    for p in parts {
        let cleaned: String = p
            .trim()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        if !cleaned.is_empty() {
            name.push('_');
            name.push_str(&cleaned);
        }
    }
    name.push_str(".csv");
    name
}

fn num(v: f64) -> String {
    v.to_string()
}

pub fn student_grades_csv(report: &StudentReport) -> Result<CsvExport, CalcError> {
    let rows = report
        .rows
        .iter()
        .map(|r| {
            vec![
                r.course.clone(),
                r.semester.to_string(),
                num(r.score),
                num(r.max_score),
                format!("{:.2}", r.percentage),
                r.grade.clone(),
                r.grade_points.to_string(),
            ]
        })
        .collect();
    let csv = write_csv(
        &["Course", "Semester", "Score", "Max Score", "Percentage", "Grade", "Grade Points"],
        rows,
    )?;
    Ok(CsvExport {
        filename: "my_grades.csv".to_string(),
        content_type: CSV_CONTENT_TYPE,
        csv,
    })
}

pub fn course_grades_csv(
    sheet: &CourseGradeSheet,
    branch: &str,
    batch_year: &str,
) -> Result<CsvExport, CalcError> {
    let rows = sheet
        .rows
        .iter()
        .map(|r| {
            vec![
                r.roll_number.clone(),
                r.name.clone(),
                num(r.score),
                num(r.max_score),
                format!("{:.2}", r.percentage),
                r.grade.clone(),
            ]
        })
        .collect();
    let csv = write_csv(
        &["Roll Number", "Name", "Score", "Max Score", "Percentage", "Grade"],
        rows,
    )?;
    Ok(CsvExport {
        filename: export_filename("course_grades", &[branch, batch_year]),
        content_type: CSV_CONTENT_TYPE,
        csv,
    })
}

pub fn batch_cgpa_csv(
    sheet: &BatchCgpaSheet,
    branch: &str,
    batch_year: &str,
) -> Result<CsvExport, CalcError> {
    let rows = sheet
        .rows
        .iter()
        .map(|r| vec![r.roll_number.clone(), r.name.clone(), format_gpa(r.cgpa)])
        .collect();
    let csv = write_csv(&["Roll Number", "Name", "CGPA"], rows)?;
    Ok(CsvExport {
        filename: export_filename("batch_cgpa", &[branch, batch_year]),
        content_type: CSV_CONTENT_TYPE,
        csv,
    })
}
