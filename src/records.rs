use crate::gpa::WeightedPoints;
use crate::grade::{self, Grade, GradeTable};
use serde::{Deserialize, Serialize};

fn default_max_score() -> f64 {
    100.0
}

fn default_credit_weight() -> f64 {
    1.0
}

/// A score row as the application hands it over. Only the numeric fields
/// feed the calculations; names are carried through to reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRecord {
    pub student_id: String,
    pub course_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(alias = "score")]
    pub raw_score: f64,
    #[serde(default = "default_max_score")]
    pub max_score: f64,
    pub semester: u8,
    #[serde(default = "default_credit_weight", alias = "credits")]
    pub credit_weight: f64,
}

impl ScoreRecord {
    pub fn percentage(&self) -> f64 {
        grade::percentage(self.raw_score, self.max_score)
    }

    pub fn grade(&self, table: &GradeTable) -> Grade {
        table.grade(self.percentage())
    }

    pub fn weighted_points(&self, table: &GradeTable) -> WeightedPoints {
        WeightedPoints {
            points: f64::from(self.grade(table).points),
            weight: self.credit_weight,
        }
    }

    /// Subject, else course name, else course id.
    pub fn subject_label(&self) -> &str {
        self.subject
            .as_deref()
            .or(self.course_name.as_deref())
            .unwrap_or(&self.course_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentInfo {
    pub student_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "collegeId")]
    pub roll_number: String,
}

impl StudentInfo {
    /// Placeholder used when a score refers to a student missing from the roster.
    pub fn unknown(student_id: &str) -> Self {
        Self {
            student_id: student_id.to_string(),
            name: String::new(),
            roll_number: student_id.to_string(),
        }
    }
}

/// Distinct students referenced by the records, in first-seen order.
pub fn roster_from_records(records: &[ScoreRecord]) -> Vec<StudentInfo> {
    let mut out: Vec<StudentInfo> = Vec::new();
    for r in records {
        if !out.iter().any(|s| s.student_id == r.student_id) {
            out.push(StudentInfo::unknown(&r.student_id));
        }
    }
    out
}
