use crate::gpa::round2;
use crate::grade::GradeTable;
use crate::records::ScoreRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Percentage histogram bands. A score goes into the first band whose
/// inclusive upper bound it does not exceed; everything above 90 is the
/// top band.
const BAND_LABELS: [&str; 5] = ["0-60", "61-70", "71-80", "81-90", "91-100"];
const BAND_UPPER_BOUNDS: [(f64, usize); 4] = [(60.0, 0), (70.0, 1), (80.0, 2), (90.0, 3)];
const TOP_BAND: usize = 4;

pub fn band_index(percentage: f64) -> usize {
    BAND_UPPER_BOUNDS
        .iter()
        .find(|(upper, _)| percentage <= *upper)
        .map(|(_, idx)| *idx)
        .unwrap_or(TOP_BAND)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionBucket {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CohortStatistics {
    pub average: Option<f64>,
    pub highest: Option<f64>,
    pub lowest: Option<f64>,
    pub sample_size: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CohortSummary {
    pub statistics: CohortStatistics,
    pub percentage_distribution: Vec<DistributionBucket>,
    pub grade_distribution: Vec<DistributionBucket>,
}

/// Average (rounded at output), highest, lowest. All `None` for an empty cohort.
pub fn statistics(percentages: &[f64]) -> CohortStatistics {
    if percentages.is_empty() {
        return CohortStatistics {
            average: None,
            highest: None,
            lowest: None,
            sample_size: 0,
        };
    }
    let sum: f64 = percentages.iter().sum();
    let highest = percentages.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let lowest = percentages.iter().copied().fold(f64::INFINITY, f64::min);
    CohortStatistics {
        average: Some(round2(sum / percentages.len() as f64)),
        highest: Some(highest),
        lowest: Some(lowest),
        sample_size: percentages.len(),
    }
}

pub fn percentage_distribution(percentages: &[f64]) -> Vec<DistributionBucket> {
    let mut counts = [0usize; 5];
    for p in percentages {
        counts[band_index(*p)] += 1;
    }
    BAND_LABELS
        .iter()
        .zip(counts)
        .map(|(label, count)| DistributionBucket {
            label: label.to_string(),
            count,
        })
        .collect()
}

/// One bucket per table row, always in table order.
pub fn grade_distribution(percentages: &[f64], table: &GradeTable) -> Vec<DistributionBucket> {
    let mut counts = vec![0usize; table.len()];
    for p in percentages {
        counts[table.band_index(*p)] += 1;
    }
    table
        .rows()
        .iter()
        .zip(counts)
        .map(|(row, count)| DistributionBucket {
            label: row.label(),
            count,
        })
        .collect()
}

pub fn aggregate(percentages: &[f64], table: &GradeTable) -> CohortSummary {
    CohortSummary {
        statistics: statistics(percentages),
        percentage_distribution: percentage_distribution(percentages),
        grade_distribution: grade_distribution(percentages, table),
    }
}

/// Element-wise sum keyed by label, keeping `a`'s order. Labels only present
/// in `b` are appended.
pub fn merge_distributions(
    a: &[DistributionBucket],
    b: &[DistributionBucket],
) -> Vec<DistributionBucket> {
    let mut out = a.to_vec();
    for bucket in b {
        match out.iter_mut().find(|o| o.label == bucket.label) {
            Some(slot) => slot.count += bucket.count,
            None => out.push(bucket.clone()),
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseScores {
    pub course_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_name: Option<String>,
    pub percentages: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSummary {
    pub course_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_name: Option<String>,
    #[serde(flatten)]
    pub summary: CohortSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiCourseSummary {
    pub courses: Vec<CourseSummary>,
    pub combined: CohortSummary,
}

/// Branch/batch view over several courses.
///
/// Combined distributions are the element-wise sum of the per-course ones.
/// Combined statistics are recomputed from the pooled scores, never from the
/// per-course averages.
pub fn aggregate_courses(courses: &[CourseScores], table: &GradeTable) -> MultiCourseSummary {
    let per_course: Vec<CourseSummary> = courses
        .iter()
        .map(|c| CourseSummary {
            course_id: c.course_id.clone(),
            course_name: c.course_name.clone(),
            summary: aggregate(&c.percentages, table),
        })
        .collect();

    let empty = aggregate(&[], table);
    let (percentage_distribution, grade_distribution) = per_course.iter().fold(
        (empty.percentage_distribution, empty.grade_distribution),
        |(pct, grd), c| {
            (
                merge_distributions(&pct, &c.summary.percentage_distribution),
                merge_distributions(&grd, &c.summary.grade_distribution),
            )
        },
    );

    let pooled: Vec<f64> = courses
        .iter()
        .flat_map(|c| c.percentages.iter().copied())
        .collect();

    MultiCourseSummary {
        courses: per_course,
        combined: CohortSummary {
            statistics: statistics(&pooled),
            percentage_distribution,
            grade_distribution,
        },
    }
}

/// Group score records into per-course percentage lists, in first-seen order.
pub fn course_scores(records: &[ScoreRecord]) -> Vec<CourseScores> {
    let mut out: Vec<CourseScores> = Vec::new();
    for r in records {
        match out.iter_mut().find(|c| c.course_id == r.course_id) {
            Some(c) => {
                c.percentages.push(r.percentage());
                if c.course_name.is_none() {
                    c.course_name = r.course_name.clone();
                }
            }
            None => out.push(CourseScores {
                course_id: r.course_id.clone(),
                course_name: r.course_name.clone(),
                percentages: vec![r.percentage()],
            }),
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketShare {
    pub label: String,
    pub share: f64,
}

/// Each bucket as a percentage of the total, 2 decimals. All zero when empty.
pub fn distribution_shares(buckets: &[DistributionBucket]) -> Vec<BucketShare> {
    let total: usize = buckets.iter().map(|b| b.count).sum();
    buckets
        .iter()
        .map(|b| BucketShare {
            label: b.label.clone(),
            share: if total > 0 {
                round2(100.0 * b.count as f64 / total as f64)
            } else {
                0.0
            },
        })
        .collect()
}

/// Share of the cohort scoring strictly below `score`, as a whole percent.
pub fn percentile_rank(percentages: &[f64], score: f64) -> Option<u32> {
    if percentages.is_empty() {
        return None;
    }
    let below = percentages.iter().filter(|p| **p < score).count();
    Some((100.0 * below as f64 / percentages.len() as f64).round() as u32)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectAverage {
    pub semester: u8,
    pub subject: String,
    pub average: f64,
    pub sample_size: usize,
}

/// Mean percentage per (semester, subject), sorted by semester then subject.
pub fn subject_averages(records: &[ScoreRecord]) -> Vec<SubjectAverage> {
    let mut groups: BTreeMap<(u8, String), (f64, usize)> = BTreeMap::new();
    for r in records {
        let entry = groups
            .entry((r.semester, r.subject_label().to_string()))
            .or_insert((0.0, 0));
        entry.0 += r.percentage();
        entry.1 += 1;
    }
    groups
        .into_iter()
        .map(|((semester, subject), (sum, count))| SubjectAverage {
            semester,
            subject,
            average: round2(sum / count as f64),
            sample_size: count,
        })
        .collect()
}
