//! Converts Brazilian high-school grades into U.S.-style GPA figures.
//!
//! The engine (`grading`, `gpa`, `metrics`) is pure: plain data in, plain data
//! out, no errors and no I/O. `gradebook`, `store` and `config` wrap it with
//! validation, caching and persistence for callers such as the `pondera` CLI.

pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod gpa;
pub mod gradebook;
pub mod grading;
pub mod metrics;
pub mod models;
pub mod report;
pub mod store;

pub use error::{GradebookError, Result};
pub use gradebook::Gradebook;
pub use models::{
    GpaCalculation, Student, Subject, SubjectGrade, SubjectLevel, SubjectType, Year, YearlyGpa,
    YearlyRecord,
};
