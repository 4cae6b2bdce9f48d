use crate::error::CalcError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::OnceLock;

/// One row of a grading scale: any percentage `>= min_percentage` (and below
/// the previous row's threshold) earns `letter` / `points`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeThreshold {
    pub letter: String,
    pub points: u8,
    pub min_percentage: f64,
}

impl GradeThreshold {
    pub fn new(letter: &str, points: u8, min_percentage: f64) -> Self {
        Self {
            letter: letter.to_string(),
            points,
            min_percentage,
        }
    }

    pub fn label(&self) -> String {
        grade_label(&self.letter, self.points)
    }
}

fn grade_label(letter: &str, points: u8) -> String {
    format!("{} ({})", letter, points)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Grade {
    pub letter: String,
    pub points: u8,
}

impl Grade {
    /// Display form used by charts and reports, e.g. `A+ (10)`.
    pub fn label(&self) -> String {
        grade_label(&self.letter, self.points)
    }
}

/// Ordered grading scale, highest threshold first.
///
/// Rows are private so every table in circulation has passed `new`: it is
/// non-empty, strictly descending and bottoms out at or below zero, which
/// makes `grade` total over every non-negative percentage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<GradeThreshold>", into = "Vec<GradeThreshold>")]
pub struct GradeTable {
    rows: Vec<GradeThreshold>,
}

static STANDARD_TABLE: OnceLock<GradeTable> = OnceLock::new();

// `new` rejects empty tables.
#[allow(clippy::len_without_is_empty)]
impl GradeTable {
    pub fn new(rows: Vec<GradeThreshold>) -> Result<Self, CalcError> {
        if rows.is_empty() {
            return Err(CalcError::new(
                "bad_grade_table",
                "grade table must have at least one row",
            ));
        }

        let mut seen: HashSet<&str> = HashSet::new();
        for (idx, row) in rows.iter().enumerate() {
            if row.letter.trim().is_empty() {
                return Err(CalcError::new("bad_grade_table", "grade letter must not be empty")
                    .with_details(serde_json::json!({ "row": idx })));
            }
            if !seen.insert(row.letter.as_str()) {
                return Err(CalcError::new("bad_grade_table", "duplicate grade letter")
                    .with_details(serde_json::json!({ "row": idx, "letter": row.letter })));
            }
            if !row.min_percentage.is_finite() {
                return Err(CalcError::new(
                    "bad_grade_table",
                    "minPercentage must be a finite number",
                )
                .with_details(serde_json::json!({ "row": idx })));
            }
            if idx > 0 && row.min_percentage >= rows[idx - 1].min_percentage {
                return Err(CalcError::new(
                    "bad_grade_table",
                    "thresholds must be strictly descending",
                )
                .with_details(serde_json::json!({
                    "row": idx,
                    "minPercentage": row.min_percentage,
                    "previous": rows[idx - 1].min_percentage
                })));
            }
        }

        let floor = rows[rows.len() - 1].min_percentage;
        if floor > 0.0 {
            return Err(CalcError::new(
                "bad_grade_table",
                "last threshold must be 0 or lower",
            )
            .with_details(serde_json::json!({ "minPercentage": floor })));
        }

        Ok(Self { rows })
    }

    /// The 10-point scale: A+ 90, A 80, B+ 70, B 60, C+ 55, C 50, D 45, F 0.
    pub fn standard() -> &'static GradeTable {
        STANDARD_TABLE.get_or_init(|| GradeTable {
            rows: vec![
                GradeThreshold::new("A+", 10, 90.0),
                GradeThreshold::new("A", 9, 80.0),
                GradeThreshold::new("B+", 8, 70.0),
                GradeThreshold::new("B", 7, 60.0),
                GradeThreshold::new("C+", 6, 55.0),
                GradeThreshold::new("C", 5, 50.0),
                GradeThreshold::new("D", 4, 45.0),
                GradeThreshold::new("F", 3, 0.0),
            ],
        })
    }

    pub fn rows(&self) -> &[GradeThreshold] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Index of the row a percentage falls into. Ties go to the higher band;
    /// anything under every threshold (negatives, NaN) lands on the last row.
    pub fn band_index(&self, percentage: f64) -> usize {
        self.rows
            .iter()
            .position(|row| percentage >= row.min_percentage)
            .unwrap_or(self.rows.len().saturating_sub(1))
    }

    pub fn grade(&self, percentage: f64) -> Grade {
        let row = &self.rows[self.band_index(percentage)];
        Grade {
            letter: row.letter.clone(),
            points: row.points,
        }
    }

    pub fn grade_for_score(&self, raw_score: f64, max_score: f64) -> Grade {
        self.grade(percentage(raw_score, max_score))
    }
}

impl Default for GradeTable {
    fn default() -> Self {
        GradeTable::standard().clone()
    }
}

impl TryFrom<Vec<GradeThreshold>> for GradeTable {
    type Error = CalcError;

    fn try_from(rows: Vec<GradeThreshold>) -> Result<Self, Self::Error> {
        GradeTable::new(rows)
    }
}

impl From<GradeTable> for Vec<GradeThreshold> {
    fn from(table: GradeTable) -> Self {
        table.rows
    }
}

/// `raw / max * 100`; a non-positive maximum projects to 0.
pub fn percentage(raw_score: f64, max_score: f64) -> f64 {
    if max_score > 0.0 {
        100.0 * raw_score / max_score
    } else {
        0.0
    }
}

/// Grade against the standard scale.
pub fn grade(percentage: f64) -> Grade {
    GradeTable::standard().grade(percentage)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_ties_go_to_the_higher_band() {
        assert_eq!(grade(90.0).letter, "A+");
        assert_eq!(grade(89.999).letter, "A");
        assert_eq!(grade(45.0).letter, "D");
        assert_eq!(grade(44.999).letter, "F");
        assert_eq!(grade(55.0).points, 6);
    }

    #[test]
    fn out_of_range_values_are_graded_literally() {
        assert_eq!(grade(-5.0), Grade { letter: "F".into(), points: 3 });
        assert_eq!(grade(140.0).letter, "A+");
        assert_eq!(grade(f64::NAN).letter, "F");
    }

    #[test]
    fn percentage_guards_zero_max() {
        assert_eq!(percentage(45.0, 50.0), 90.0);
        assert_eq!(percentage(12.0, 0.0), 0.0);
        assert_eq!(GradeTable::standard().grade_for_score(36.0, 40.0).letter, "A+");
    }

    #[test]
    fn rejects_tables_that_are_not_strictly_descending() {
        let err = GradeTable::new(vec![
            GradeThreshold::new("P", 5, 50.0),
            GradeThreshold::new("Q", 4, 50.0),
            GradeThreshold::new("F", 0, 0.0),
        ])
        .unwrap_err();
        assert_eq!(err.code, "bad_grade_table");
    }

    #[test]
    fn rejects_tables_without_a_floor() {
        let err = GradeTable::new(vec![
            GradeThreshold::new("P", 5, 50.0),
            GradeThreshold::new("F", 0, 10.0),
        ])
        .unwrap_err();
        assert_eq!(err.code, "bad_grade_table");
        assert!(GradeTable::new(Vec::new()).is_err());
    }

    #[test]
    fn deserializing_a_table_validates_it() {
        let ok: GradeTable = serde_json::from_value(serde_json::json!([
            { "letter": "P", "points": 1, "minPercentage": 40 },
            { "letter": "F", "points": 0, "minPercentage": 0 }
        ]))
        .expect("valid table");
        assert_eq!(ok.grade(40.0).letter, "P");

        let bad = serde_json::from_value::<GradeTable>(serde_json::json!([
            { "letter": "P", "points": 1, "minPercentage": 40 },
            { "letter": "P", "points": 0, "minPercentage": 0 }
        ]));
        assert!(bad.is_err());
    }

    #[test]
    fn label_includes_points() {
        assert_eq!(grade(91.0).label(), "A+ (10)");
        assert_eq!(GradeTable::standard().rows()[7].label(), "F (3)");
    }

    #[test]
    fn grade_label_matches_its_table_row() {
        let table = GradeTable::standard();
        for (idx, row) in table.rows().iter().enumerate() {
            let g = table.grade(row.min_percentage);
            assert_eq!(table.band_index(row.min_percentage), idx);
            assert_eq!(g.label(), row.label());
        }
    }
}
