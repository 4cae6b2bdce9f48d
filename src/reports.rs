//! Report models assembled from score records.
//!
//! Each model is what the application renders into a JSON response, a CSV
//! download or a document. Building one never fails; undefined aggregates
//! stay `None` all the way out.

use crate::cohort::{self, BucketShare, CohortStatistics, CohortSummary, DistributionBucket, SubjectAverage};
use crate::gpa::{self, AcademicRecord, CgpaPolicy, SemesterFilter};
use crate::grade::GradeTable;
use crate::records::{ScoreRecord, StudentInfo};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy)]
pub struct ReportContext<'a> {
    pub table: &'a GradeTable,
    pub policy: CgpaPolicy,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentGradeRow {
    pub course_id: String,
    pub course: String,
    pub semester: u8,
    pub score: f64,
    pub max_score: f64,
    pub percentage: f64,
    pub grade: String,
    pub grade_points: u8,
    pub credits: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentReport {
    pub student: StudentInfo,
    pub rows: Vec<StudentGradeRow>,
    pub academic: AcademicRecord,
}

/// A student's own scores, sorted by semester then course, with SGPA/CGPA.
pub fn student_report(
    ctx: &ReportContext<'_>,
    student: &StudentInfo,
    records: &[ScoreRecord],
    filter: SemesterFilter,
) -> StudentReport {
    let own: Vec<ScoreRecord> = records
        .iter()
        .filter(|r| r.student_id == student.student_id)
        .cloned()
        .collect();

    let mut rows: Vec<StudentGradeRow> = own
        .iter()
        .filter(|r| filter.matches(r.semester))
        .map(|r| {
            let grade = r.grade(ctx.table);
            StudentGradeRow {
                course_id: r.course_id.clone(),
                course: r.subject_label().to_string(),
                semester: r.semester,
                score: r.raw_score,
                max_score: r.max_score,
                percentage: gpa::round2(r.percentage()),
                grade: grade.letter,
                grade_points: grade.points,
                credits: r.credit_weight,
            }
        })
        .collect();
    rows.sort_by(|a, b| a.semester.cmp(&b.semester).then_with(|| a.course.cmp(&b.course)));

    StudentReport {
        student: student.clone(),
        rows,
        academic: gpa::academic_record(&own, ctx.table, ctx.policy, filter),
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseGradeRow {
    pub student_id: String,
    pub roll_number: String,
    pub name: String,
    pub score: f64,
    pub max_score: f64,
    pub percentage: f64,
    pub grade: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseGradeSheet {
    pub rows: Vec<CourseGradeRow>,
    pub summary: CohortSummary,
}

fn roster_index(students: &[StudentInfo]) -> HashMap<&str, &StudentInfo> {
    students.iter().map(|s| (s.student_id.as_str(), s)).collect()
}

/// Every score in a course (or any record set), one row per score, in input order.
pub fn course_grade_sheet(
    ctx: &ReportContext<'_>,
    students: &[StudentInfo],
    records: &[ScoreRecord],
) -> CourseGradeSheet {
    let roster = roster_index(students);
    let rows: Vec<CourseGradeRow> = records
        .iter()
        .map(|r| {
            let student = roster
                .get(r.student_id.as_str())
                .map(|s| (*s).clone())
                .unwrap_or_else(|| StudentInfo::unknown(&r.student_id));
            CourseGradeRow {
                student_id: r.student_id.clone(),
                roll_number: student.roll_number,
                name: student.name,
                score: r.raw_score,
                max_score: r.max_score,
                percentage: gpa::round2(r.percentage()),
                grade: r.grade(ctx.table).letter,
            }
        })
        .collect();

    let percentages: Vec<f64> = records.iter().map(|r| r.percentage()).collect();
    CourseGradeSheet {
        rows,
        summary: cohort::aggregate(&percentages, ctx.table),
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchCgpaRow {
    pub student_id: String,
    pub roll_number: String,
    pub name: String,
    pub cgpa: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchCgpaSheet {
    pub policy: CgpaPolicy,
    pub rows: Vec<BatchCgpaRow>,
    pub statistics: CohortStatistics,
}

/// One CGPA per roster student, in roster order. Students without scores get
/// `None`. `statistics` covers the students that have a CGPA.
pub fn batch_cgpa_sheet(
    ctx: &ReportContext<'_>,
    students: &[StudentInfo],
    records: &[ScoreRecord],
) -> BatchCgpaSheet {
    let mut by_student: HashMap<&str, Vec<ScoreRecord>> = HashMap::new();
    for r in records {
        by_student
            .entry(r.student_id.as_str())
            .or_default()
            .push(r.clone());
    }

    let rows: Vec<BatchCgpaRow> = students
        .iter()
        .map(|s| {
            let cgpa = by_student
                .get(s.student_id.as_str())
                .and_then(|own| {
                    gpa::academic_record(own, ctx.table, ctx.policy, SemesterFilter::All)
                        .cgpa
                        .value
                });
            BatchCgpaRow {
                student_id: s.student_id.clone(),
                roll_number: s.roll_number.clone(),
                name: s.name.clone(),
                cgpa,
            }
        })
        .collect();

    let values: Vec<f64> = rows.iter().filter_map(|r| r.cgpa).collect();
    BatchCgpaSheet {
        policy: ctx.policy,
        rows,
        statistics: cohort::statistics(&values),
    }
}

pub fn batch_averages(records: &[ScoreRecord]) -> Vec<SubjectAverage> {
    cohort::subject_averages(records)
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoursePerformance {
    pub course_id: String,
    pub course_name: String,
    pub statistics: CohortStatistics,
    pub percentage_distribution: Vec<DistributionBucket>,
    pub distribution_shares: Vec<BucketShare>,
    pub grade_distribution: Vec<DistributionBucket>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchPerformance {
    pub courses: Vec<CoursePerformance>,
    pub combined: CohortSummary,
}

/// Per-course statistics for a branch/batch plus the merged view.
pub fn batch_performance(ctx: &ReportContext<'_>, records: &[ScoreRecord]) -> BatchPerformance {
    let merged = cohort::aggregate_courses(&cohort::course_scores(records), ctx.table);
    let courses = merged
        .courses
        .into_iter()
        .map(|c| CoursePerformance {
            course_name: c.course_name.unwrap_or_else(|| c.course_id.clone()),
            course_id: c.course_id,
            statistics: c.summary.statistics,
            distribution_shares: cohort::distribution_shares(&c.summary.percentage_distribution),
            percentage_distribution: c.summary.percentage_distribution,
            grade_distribution: c.summary.grade_distribution,
        })
        .collect();

    BatchPerformance {
        courses,
        combined: merged.combined,
    }
}
