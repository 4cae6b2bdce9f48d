use crate::grade::GradeTable;
use crate::records::ScoreRecord;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightedPoints {
    pub points: f64,
    pub weight: f64,
}

/// Round half up to 2 decimals: `Int(100*x + 0.5) / 100`.
///
/// The scaled value is snapped to 6 decimals first, so a tie such as `4.395`
/// (stored as `4.39499..`) still rounds up.
pub fn round2(x: f64) -> f64 {
    let scaled = ((100.0 * x) * 1e6).round() / 1e6;
    (scaled + 0.5).floor() / 100.0
}

fn to_hundredths(v: f64) -> i64 {
    (v * 100.0).round() as i64
}

/// `sum(points * weight) / sum(weight)`, unrounded.
///
/// `None` when there is nothing to average (no entries, or weights summing
/// to zero). Callers show that as "N/A", not 0.00.
pub fn weighted_average(entries: &[WeightedPoints]) -> Option<f64> {
    let mut sum = 0.0_f64;
    let mut denom = 0.0_f64;
    for e in entries {
        sum += e.points * e.weight;
        denom += e.weight;
    }
    if entries.is_empty() || denom == 0.0 {
        None
    } else {
        Some(sum / denom)
    }
}

/// How semester results combine into a CGPA.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CgpaPolicy {
    /// Round every SGPA to 2 decimals, then take the plain mean of the
    /// rounded values. Matches the historical report output.
    #[default]
    TwoStage,
    /// One credit-weighted average over every score, rounded once.
    CreditWeighted,
}

impl CgpaPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            CgpaPolicy::TwoStage => "twoStage",
            CgpaPolicy::CreditWeighted => "creditWeighted",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpaScope {
    Semester(u8),
    Overall,
}

impl Serialize for GpaScope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            GpaScope::Semester(n) => serializer.serialize_u8(*n),
            GpaScope::Overall => serializer.serialize_str("overall"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GpaResult {
    pub scope: GpaScope,
    pub value: Option<f64>,
}

impl GpaResult {
    /// Two decimals, or `N/A` when undefined.
    pub fn display(&self) -> String {
        format_gpa(self.value)
    }
}

pub fn format_gpa(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}", v),
        None => "N/A".to_string(),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SemesterFilter {
    #[default]
    All,
    Only(u8),
}

impl SemesterFilter {
    pub fn matches(self, semester: u8) -> bool {
        match self {
            SemesterFilter::All => true,
            SemesterFilter::Only(n) => n == semester,
        }
    }
}

impl Serialize for SemesterFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SemesterFilter::All => serializer.serialize_str("all"),
            SemesterFilter::Only(n) => serializer.serialize_u8(*n),
        }
    }
}

/// Rounded credit-weighted grade-point average of one semester's scores.
pub fn sgpa<'a, I>(records: I, table: &GradeTable) -> Option<f64>
where
    I: IntoIterator<Item = &'a ScoreRecord>,
{
    let entries: Vec<WeightedPoints> = records
        .into_iter()
        .map(|r| r.weighted_points(table))
        .collect();
    weighted_average(&entries).map(round2)
}

/// Plain mean of already-rounded SGPAs, rounded again.
pub fn two_stage_cgpa(rounded_sgpas: &[f64]) -> Option<f64> {
    if rounded_sgpas.is_empty() {
        return None;
    }
    // Sum in whole hundredths and divide half up: (2*sum + n) / 2n.
    let total: i64 = rounded_sgpas.iter().map(|v| to_hundredths(*v)).sum();
    let n = rounded_sgpas.len() as i64;
    let mean = (2 * total + n).div_euclid(2 * n);
    Some(mean as f64 / 100.0)
}

/// Single-stage credit-weighted CGPA across every record.
pub fn credit_weighted_cgpa<'a, I>(records: I, table: &GradeTable) -> Option<f64>
where
    I: IntoIterator<Item = &'a ScoreRecord>,
{
    sgpa(records, table)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcademicRecord {
    pub semester_filter: SemesterFilter,
    pub policy: CgpaPolicy,
    pub sgpa: Vec<GpaResult>,
    pub cgpa: GpaResult,
}

/// SGPA per semester (ascending) plus the CGPA over the selected semesters.
pub fn academic_record(
    records: &[ScoreRecord],
    table: &GradeTable,
    policy: CgpaPolicy,
    filter: SemesterFilter,
) -> AcademicRecord {
    let mut by_semester: BTreeMap<u8, Vec<&ScoreRecord>> = BTreeMap::new();
    for r in records.iter().filter(|r| filter.matches(r.semester)) {
        by_semester.entry(r.semester).or_default().push(r);
    }

    let sgpa_list: Vec<GpaResult> = by_semester
        .iter()
        .map(|(semester, rows)| GpaResult {
            scope: GpaScope::Semester(*semester),
            value: sgpa(rows.iter().copied(), table),
        })
        .collect();

    let cgpa = match policy {
        CgpaPolicy::TwoStage => {
            let rounded: Vec<f64> = sgpa_list.iter().filter_map(|s| s.value).collect();
            two_stage_cgpa(&rounded)
        }
        CgpaPolicy::CreditWeighted => {
            credit_weighted_cgpa(by_semester.values().flatten().copied(), table)
        }
    };

    AcademicRecord {
        semester_filter: filter,
        policy,
        sgpa: sgpa_list,
        cgpa: GpaResult {
            scope: GpaScope::Overall,
            value: cgpa,
        },
    }
}
