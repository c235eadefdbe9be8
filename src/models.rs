use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::gpa;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubjectType {
    Core,
    Elective,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubjectLevel {
    #[default]
    Regular,
    Honors,
    Ap,
}

impl SubjectLevel {
    /// Weighted-GPA bonus granted for the course level.
    pub fn bonus(self) -> f64 {
        match self {
            SubjectLevel::Regular => 0.0,
            SubjectLevel::Honors => 0.5,
            SubjectLevel::Ap => 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub subject_type: SubjectType,
    pub level: SubjectLevel,
    pub credits: f64,
}

impl Subject {
    pub fn is_core(&self) -> bool {
        self.subject_type == SubjectType::Core
    }
}

/// One subject's grades for a year. `None` marks a period not yet entered,
/// `Some(0.0)` is a scored zero.
///
/// `final_grade` and `gpa_points` are derived from `grades` and only change
/// through [`SubjectGrade::recompute`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectGrade {
    pub subject: Subject,
    pub grades: Vec<Option<f64>>,
    #[serde(default)]
    pub final_grade: f64,
    #[serde(default)]
    pub gpa_points: f64,
}

impl SubjectGrade {
    pub fn new(subject: Subject, periods: usize) -> Self {
        let mut grade = SubjectGrade {
            subject,
            grades: vec![None; periods],
            final_grade: 0.0,
            gpa_points: 0.0,
        };
        grade.recompute();
        grade
    }

    pub fn entered_grades(&self) -> Vec<f64> {
        self.grades.iter().flatten().copied().collect()
    }

    pub fn has_entered_grades(&self) -> bool {
        self.grades.iter().any(Option::is_some)
    }

    pub fn recompute(&mut self) {
        let derived = gpa::calculate_subject_grades_and_gpa(&self.entered_grades());
        self.final_grade = derived.final_grade;
        self.gpa_points = derived.gpa_points;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Year {
    First,
    Second,
    Third,
}

impl Year {
    pub const ALL: [Year; 3] = [Year::First, Year::Second, Year::Third];

    pub fn number(self) -> u8 {
        match self {
            Year::First => 1,
            Year::Second => 2,
            Year::Third => 3,
        }
    }
}

impl TryFrom<u8> for Year {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Year::First),
            2 => Ok(Year::Second),
            3 => Ok(Year::Third),
            other => Err(format!("academic year must be 1, 2 or 3, got {other}")),
        }
    }
}

impl From<Year> for u8 {
    fn from(year: Year) -> Self {
        year.number()
    }
}

impl std::fmt::Display for Year {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.number())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyRecord {
    pub year: Year,
    pub subjects: Vec<SubjectGrade>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct YearlyGpa {
    /// Left empty by [`gpa::calculate_yearly_gpa`]; stamped by the caller.
    pub year: Option<Year>,
    pub unweighted: f64,
    pub weighted: f64,
    pub core_only: f64,
    pub total_credits: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpaCalculation {
    pub unweighted: f64,
    pub weighted: f64,
    pub core_only: f64,
    pub total_credits: f64,
    pub yearly_breakdown: Vec<YearlyGpa>,
    pub calculated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub name: String,
    pub school: Option<String>,
    pub graduation_year: i32,
    pub student_id: Option<String>,
}

impl Default for Student {
    fn default() -> Self {
        use chrono::Datelike;

        Student {
            name: String::new(),
            school: None,
            graduation_year: Utc::now().year() + 1,
            student_id: None,
        }
    }
}
