//! Grade computation and aggregation for academic records.
//!
//! Scores come in as plain records; grades, SGPA/CGPA, cohort statistics and
//! report models go out. Nothing here touches storage or the network.

pub mod cohort;
pub mod config;
pub mod error;
pub mod export;
pub mod gpa;
pub mod grade;
pub mod records;
pub mod reports;

pub use config::CalcConfig;
pub use error::CalcError;
pub use grade::{grade, Grade, GradeTable, GradeThreshold};
