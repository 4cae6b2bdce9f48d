pub mod cohort;
pub mod core;
pub mod export;
pub mod gpa;
pub mod grading;
pub mod reports;
