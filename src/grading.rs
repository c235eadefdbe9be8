use serde::{Deserialize, Serialize};

/// Percentage breakpoints on the 4.0 scale, scanned high to low.
const GPA_THRESHOLDS: [(f64, f64); 5] = [
    (90.0, 4.0),
    (80.0, 3.0),
    (70.0, 2.0),
    (60.0, 1.0),
    (0.0, 0.0),
];

pub const DEFAULT_SCALE: f64 = 10.0;

/// Maps a grade recorded on the 10-point scale to a 4.0 GPA point.
pub fn grade_to_gpa(grade: f64) -> f64 {
    grade_to_gpa_on_scale(grade, DEFAULT_SCALE)
}

/// Stepped conversion: the result is the point of the highest threshold not
/// exceeding the grade's percentage. Anything below the lowest threshold,
/// including NaN, maps to 0.0.
pub fn grade_to_gpa_on_scale(grade: f64, scale: f64) -> f64 {
    let percentage = if scale == 100.0 {
        grade
    } else {
        grade / scale * 100.0
    };

    GPA_THRESHOLDS
        .iter()
        .find(|(threshold, _)| percentage >= *threshold)
        .map(|(_, point)| *point)
        .unwrap_or(0.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Excellent,
    VeryGood,
    Good,
    Satisfactory,
    Regular,
    Insufficient,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpaClassification {
    pub tier: Tier,
    pub label: &'static str,
    pub color: &'static str,
    pub bg_color: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
}

const INSUFFICIENT: GpaClassification = GpaClassification {
    tier: Tier::Insufficient,
    label: "Insufficient",
    color: "#ef4444",
    bg_color: "#ef444420",
    icon: "❌",
    description: "Below Average",
};

const CLASSIFICATIONS: [(f64, GpaClassification); 6] = [
    (
        3.7,
        GpaClassification {
            tier: Tier::Excellent,
            label: "Excellent",
            color: "#10b981",
            bg_color: "#10b98120",
            icon: "🌟",
            description: "Summa Cum Laude",
        },
    ),
    (
        3.3,
        GpaClassification {
            tier: Tier::VeryGood,
            label: "Very Good",
            color: "#059669",
            bg_color: "#05966920",
            icon: "⭐",
            description: "Magna Cum Laude",
        },
    ),
    (
        3.0,
        GpaClassification {
            tier: Tier::Good,
            label: "Good",
            color: "#0d9488",
            bg_color: "#0d948820",
            icon: "✅",
            description: "Cum Laude",
        },
    ),
    (
        2.7,
        GpaClassification {
            tier: Tier::Satisfactory,
            label: "Satisfactory",
            color: "#f59e0b",
            bg_color: "#f59e0b20",
            icon: "👍",
            description: "Approved",
        },
    ),
    (
        2.0,
        GpaClassification {
            tier: Tier::Regular,
            label: "Regular",
            color: "#d97706",
            bg_color: "#d9770620",
            icon: "⚠️",
            description: "Needs Improvement",
        },
    ),
    (0.0, INSUFFICIENT),
];

/// Classifies a GPA into a performance tier. Values below every threshold
/// (negative or NaN) fall through to the lowest tier.
pub fn gpa_classification(gpa: f64) -> GpaClassification {
    CLASSIFICATIONS
        .iter()
        .find(|(threshold, _)| gpa >= *threshold)
        .map(|(_, classification)| *classification)
        .unwrap_or(INSUFFICIENT)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GradeScale {
    #[default]
    #[serde(rename = "0-10")]
    ZeroToTen,
    #[serde(rename = "0-100")]
    ZeroToHundred,
    #[serde(rename = "A-F")]
    Letter,
    #[serde(rename = "conceitos")]
    Concepts,
}

impl GradeScale {
    pub fn as_str(self) -> &'static str {
        match self {
            GradeScale::ZeroToTen => "0-10",
            GradeScale::ZeroToHundred => "0-100",
            GradeScale::Letter => "A-F",
            GradeScale::Concepts => "conceitos",
        }
    }

    /// Upper bound of a numeric scale; `None` for letter and concept scales.
    pub fn max(self) -> Option<f64> {
        match self {
            GradeScale::ZeroToTen => Some(10.0),
            GradeScale::ZeroToHundred => Some(100.0),
            GradeScale::Letter | GradeScale::Concepts => None,
        }
    }
}

impl std::fmt::Display for GradeScale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for GradeScale {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "0-10" => Ok(GradeScale::ZeroToTen),
            "0-100" => Ok(GradeScale::ZeroToHundred),
            "A-F" => Ok(GradeScale::Letter),
            "conceitos" => Ok(GradeScale::Concepts),
            other => Err(format!("unknown grade scale '{other}'")),
        }
    }
}

/// True iff `value` lies inside the numeric range of `scale`. Non-numeric
/// scales accept anything.
pub fn validate_grade(value: f64, scale: GradeScale) -> bool {
    match scale.max() {
        Some(max) => (0.0..=max).contains(&value),
        None => true,
    }
}
