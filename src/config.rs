//! Settings loaded from `pondera.toml`.
//!
//! ```toml
//! grading_system = "semestral"
//! grade_scale = "0-100"
//!
//! [targets]
//! target_gpa = 3.5
//! minimum_gpa = 2.0
//!
//! [performance]
//! enable_cache = true
//! ```
//!
//! Every key is optional; missing keys take their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::grading::GradeScale;

pub const DEFAULT_CONFIG_FILE: &str = "pondera.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradingSystem {
    #[default]
    Trimestral,
    Semestral,
    Annual,
}

impl GradingSystem {
    pub fn as_str(self) -> &'static str {
        match self {
            GradingSystem::Trimestral => "trimestral",
            GradingSystem::Semestral => "semestral",
            GradingSystem::Annual => "annual",
        }
    }

    pub fn periods(self) -> usize {
        match self {
            GradingSystem::Trimestral => 3,
            GradingSystem::Semestral => 2,
            GradingSystem::Annual => 1,
        }
    }
}

impl std::str::FromStr for GradingSystem {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value {
            "trimestral" => Ok(GradingSystem::Trimestral),
            "semestral" => Ok(GradingSystem::Semestral),
            "annual" => Ok(GradingSystem::Annual),
            other => Err(format!("unknown grading system '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GpaTargets {
    pub target_gpa: f64,
    pub minimum_gpa: f64,
    pub dream_gpa: f64,
    pub enable_goal_tracking: bool,
}

impl Default for GpaTargets {
    fn default() -> Self {
        GpaTargets {
            target_gpa: 3.5,
            minimum_gpa: 2.0,
            dream_gpa: 4.0,
            enable_goal_tracking: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoalProgress {
    pub meets_minimum: bool,
    pub meets_target: bool,
    pub meets_dream: bool,
    /// Points still missing to reach the target; 0 once it is met.
    pub to_target: f64,
}

impl GpaTargets {
    pub fn evaluate(&self, gpa: f64) -> GoalProgress {
        GoalProgress {
            meets_minimum: gpa >= self.minimum_gpa,
            meets_target: gpa >= self.target_gpa,
            meets_dream: gpa >= self.dream_gpa,
            to_target: (self.target_gpa - gpa).max(0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceSettings {
    pub enable_cache: bool,
}

impl Default for PerformanceSettings {
    fn default() -> Self {
        PerformanceSettings { enable_cache: true }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    pub decimal_places: usize,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        DisplaySettings { decimal_places: 2 }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub grading_system: GradingSystem,
    pub grade_scale: GradeScale,
    pub targets: GpaTargets,
    pub performance: PerformanceSettings,
    pub display: DisplaySettings,
}

impl Settings {
    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Reads settings from `path`, falling back to defaults when the file does
    /// not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "settings file not found, using defaults");
            return Ok(Settings::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let settings = Settings::from_toml(&contents)?;
        debug!(path = %path.display(), ?settings, "loaded settings");
        Ok(settings)
    }
}
