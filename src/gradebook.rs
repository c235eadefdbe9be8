use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::cache::{snapshot_key, CalculationCache};
use crate::catalog;
use crate::config::{GradingSystem, Settings};
use crate::error::{GradebookError, Result};
use crate::gpa;
use crate::grading::{validate_grade, GradeScale};
use crate::metrics::{self, AnnualPerformanceMetrics};
use crate::models::{
    GpaCalculation, Student, Subject, SubjectGrade, SubjectLevel, SubjectType, Year, YearlyRecord,
};

fn enabled() -> bool {
    true
}

/// Partial edit of a subject's identity; `None` fields are left as they are.
#[derive(Debug, Clone, Default)]
pub struct SubjectUpdate {
    pub name: Option<String>,
    pub subject_type: Option<SubjectType>,
    pub level: Option<SubjectLevel>,
    pub credits: Option<f64>,
}

/// A student's grades across the academic years, with the caller-side rules
/// around the pure GPA engine: input validation, scale normalization, the
/// "no grades yet" guard and result caching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gradebook {
    pub student: Student,
    grading_system: GradingSystem,
    grade_scale: GradeScale,
    records: Vec<YearlyRecord>,
    #[serde(skip)]
    cache: CalculationCache,
    #[serde(skip, default = "enabled")]
    cache_enabled: bool,
}

impl Gradebook {
    pub fn new(student: Student, grading_system: GradingSystem, grade_scale: GradeScale) -> Self {
        Gradebook {
            student,
            grading_system,
            grade_scale,
            records: catalog::default_records(grading_system.periods()),
            cache: CalculationCache::new(),
            cache_enabled: true,
        }
    }

    pub fn from_settings(student: Student, settings: &Settings) -> Self {
        let mut gradebook = Gradebook::new(student, settings.grading_system, settings.grade_scale);
        gradebook.apply_settings(settings);
        gradebook
    }

    /// Runtime preferences that are not part of the saved gradebook.
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.cache_enabled = settings.performance.enable_cache;
        if !self.cache_enabled {
            self.cache.clear();
        }
    }

    pub fn grading_system(&self) -> GradingSystem {
        self.grading_system
    }

    pub fn grade_scale(&self) -> GradeScale {
        self.grade_scale
    }

    pub fn records(&self) -> &[YearlyRecord] {
        &self.records
    }

    pub fn record(&self, year: Year) -> Option<&YearlyRecord> {
        self.records.iter().find(|record| record.year == year)
    }

    pub fn cached_calculations(&self) -> usize {
        self.cache.len()
    }

    fn record_mut(&mut self, year: Year) -> Result<&mut YearlyRecord> {
        self.cache.clear();
        self.records
            .iter_mut()
            .find(|record| record.year == year)
            .ok_or(GradebookError::UnknownYear(year))
    }

    fn subject_mut(&mut self, year: Year, id: &str) -> Result<&mut SubjectGrade> {
        self.record_mut(year)?
            .subjects
            .iter_mut()
            .find(|grade| grade.subject.id == id)
            .ok_or_else(|| GradebookError::UnknownSubject {
                year,
                id: id.to_string(),
            })
    }

    /// Replaces a year's subjects, re-deriving every final grade. A year not
    /// yet present is added in order.
    pub fn update_yearly_record(&mut self, year: Year, mut subjects: Vec<SubjectGrade>) {
        subjects.iter_mut().for_each(SubjectGrade::recompute);
        self.cache.clear();

        match self.records.iter_mut().find(|record| record.year == year) {
            Some(record) => record.subjects = subjects,
            None => {
                self.records.push(YearlyRecord { year, subjects });
                self.records.sort_by_key(|record| record.year);
            }
        }
    }

    /// Stores a grade given on the active scale. Grades on the 0-100 scale are
    /// kept on the 10-point scale the engine works with.
    pub fn set_grade(&mut self, year: Year, id: &str, period: usize, value: f64) -> Result<()> {
        let scale = self.grade_scale;
        if !value.is_finite() || !validate_grade(value, scale) {
            return Err(GradebookError::InvalidGrade { value, scale });
        }

        let periods = self.grading_system.periods();
        if period >= periods {
            return Err(GradebookError::PeriodOutOfRange { period, periods });
        }

        let normalized = match scale {
            GradeScale::ZeroToHundred => value / 10.0,
            _ => value,
        };

        let grade = self.subject_mut(year, id)?;
        if grade.grades.len() < periods {
            grade.grades.resize(periods, None);
        }
        grade.grades[period] = Some(normalized);
        grade.recompute();
        debug!(%year, id, period, value, final_grade = grade.final_grade, "grade updated");
        Ok(())
    }

    /// Marks a period as not entered.
    pub fn clear_grade(&mut self, year: Year, id: &str, period: usize) -> Result<()> {
        let periods = self.grading_system.periods();
        if period >= periods {
            return Err(GradebookError::PeriodOutOfRange { period, periods });
        }

        let grade = self.subject_mut(year, id)?;
        if let Some(slot) = grade.grades.get_mut(period) {
            *slot = None;
        }
        grade.recompute();
        Ok(())
    }

    /// Inserts a subject, or replaces the identity of the one with the same id
    /// while keeping its grades.
    pub fn upsert_subject(&mut self, year: Year, subject: Subject) -> Result<()> {
        validate_subject(&subject.name, subject.credits)?;
        let periods = self.grading_system.periods();
        let record = self.record_mut(year)?;

        match record
            .subjects
            .iter_mut()
            .find(|grade| grade.subject.id == subject.id)
        {
            Some(existing) => existing.subject = subject,
            None => record.subjects.push(SubjectGrade::new(subject, periods)),
        }
        Ok(())
    }

    /// Adds a user-defined subject and returns its generated id.
    pub fn add_custom_subject(
        &mut self,
        year: Year,
        name: &str,
        subject_type: SubjectType,
        level: SubjectLevel,
        credits: f64,
    ) -> Result<String> {
        let id = format!("custom-{}", Uuid::new_v4());
        self.upsert_subject(
            year,
            Subject {
                id: id.clone(),
                name: name.trim().to_string(),
                subject_type,
                level,
                credits,
            },
        )?;
        Ok(id)
    }

    pub fn update_subject(&mut self, year: Year, id: &str, update: SubjectUpdate) -> Result<()> {
        let grade = self.subject_mut(year, id)?;
        let name = update.name.unwrap_or_else(|| grade.subject.name.clone());
        let credits = update.credits.unwrap_or(grade.subject.credits);
        validate_subject(&name, credits)?;

        grade.subject.name = name;
        grade.subject.credits = credits;
        if let Some(subject_type) = update.subject_type {
            grade.subject.subject_type = subject_type;
        }
        if let Some(level) = update.level {
            grade.subject.level = level;
        }
        Ok(())
    }

    pub fn remove_subject(&mut self, year: Year, id: &str) -> Result<SubjectGrade> {
        let record = self.record_mut(year)?;
        let index = record
            .subjects
            .iter()
            .position(|grade| grade.subject.id == id)
            .ok_or_else(|| GradebookError::UnknownSubject {
                year,
                id: id.to_string(),
            })?;
        Ok(record.subjects.remove(index))
    }

    /// Changes the number of periods per year. Extra periods are dropped and
    /// new ones start empty.
    pub fn set_grading_system(&mut self, grading_system: GradingSystem) {
        let periods = grading_system.periods();
        self.grading_system = grading_system;
        self.cache.clear();

        for grade in self.records.iter_mut().flat_map(|r| r.subjects.iter_mut()) {
            grade.grades.resize(periods, None);
            grade.recompute();
        }
    }

    /// Changes the scale for future input. Stored grades are already on the
    /// 10-point scale and are left untouched.
    pub fn set_grade_scale(&mut self, grade_scale: GradeScale) {
        self.grade_scale = grade_scale;
    }

    pub fn has_valid_grades(&self) -> bool {
        self.records
            .iter()
            .flat_map(|record| record.subjects.iter())
            .any(SubjectGrade::has_entered_grades)
    }

    /// Every year, holding only subjects with at least one entered grade.
    /// Subjects nobody has graded yet carry no credits into the averages.
    pub fn graded_records(&self) -> Vec<YearlyRecord> {
        self.records
            .iter()
            .map(|record| YearlyRecord {
                year: record.year,
                subjects: record
                    .subjects
                    .iter()
                    .filter(|grade| grade.has_entered_grades())
                    .cloned()
                    .collect(),
            })
            .collect()
    }

    /// Cumulative GPA over every year. Fails only when no grade has been
    /// entered anywhere; an entered 0.0 is a scored grade and satisfies the
    /// check.
    pub fn calculate(&mut self) -> Result<GpaCalculation> {
        if !self.has_valid_grades() {
            return Err(GradebookError::NoValidGrades);
        }

        let graded = self.graded_records();
        if !self.cache_enabled {
            return Ok(gpa::calculate_cumulative_gpa(&graded));
        }

        let key = snapshot_key(&graded);
        if let Some(cached) = self.cache.get(&key) {
            debug!("using cached GPA calculation");
            return Ok(cached.clone());
        }

        let calculation = gpa::calculate_cumulative_gpa(&graded);
        info!(
            unweighted = calculation.unweighted,
            weighted = calculation.weighted,
            core_only = calculation.core_only,
            total_credits = calculation.total_credits,
            "calculated cumulative GPA"
        );
        self.cache.insert(key, calculation.clone());
        Ok(calculation)
    }

    /// Performance summary for one year, `None` when the year is absent.
    pub fn annual_metrics(&self, year: Year) -> Option<AnnualPerformanceMetrics> {
        self.record(year).map(metrics::annual_performance_metrics)
    }

    /// Re-derives every subject after loading a snapshot whose derived fields
    /// may be stale.
    pub(crate) fn rederive(&mut self) {
        self.cache.clear();
        for grade in self.records.iter_mut().flat_map(|r| r.subjects.iter_mut()) {
            grade.recompute();
        }
    }
}

fn validate_subject(name: &str, credits: f64) -> Result<()> {
    if name.trim().is_empty() {
        return Err(GradebookError::EmptySubjectName);
    }
    if !credits.is_finite() || credits <= 0.0 {
        return Err(GradebookError::InvalidCredits(credits));
    }
    Ok(())
}
