use thiserror::Error;

use crate::grading::GradeScale;
use crate::models::Year;

#[derive(Error, Debug)]
pub enum GradebookError {
    /// No period grade has been entered in any year. An entered 0.0 counts
    /// as a grade.
    #[error("no valid grades found to calculate the GPA")]
    NoValidGrades,

    #[error("grade {value} is outside the {scale} scale")]
    InvalidGrade { value: f64, scale: GradeScale },

    #[error("academic year {0} is not part of this gradebook")]
    UnknownYear(Year),

    #[error("subject '{id}' not found in year {year}")]
    UnknownSubject { year: Year, id: String },

    #[error("period {period} is out of range ({periods} periods per year)")]
    PeriodOutOfRange { period: usize, periods: usize },

    #[error("subject name must not be empty")]
    EmptySubjectName,

    #[error("credits must be a positive number, got {0}")]
    InvalidCredits(f64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid gradebook JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid CSV input: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid CSV row {row}: {message}")]
    CsvRow { row: usize, message: String },

    #[error("invalid settings file: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, GradebookError>;
