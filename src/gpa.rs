use chrono::{DateTime, Utc};

use crate::grading::grade_to_gpa;
use crate::models::{GpaCalculation, SubjectGrade, YearlyGpa, YearlyRecord};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubjectResult {
    pub final_grade: f64,
    pub gpa_points: f64,
}

/// Arithmetic mean of every grade given, zeros included. Empty input and
/// non-finite sums yield 0.
pub fn calculate_final_grade(grades: &[f64]) -> f64 {
    if grades.is_empty() {
        return 0.0;
    }

    let mean = grades.iter().sum::<f64>() / grades.len() as f64;
    if mean.is_finite() {
        mean
    } else {
        0.0
    }
}

/// Final grade and GPA points for grades already on the 10-point scale.
pub fn calculate_subject_grades_and_gpa(grades: &[f64]) -> SubjectResult {
    let final_grade = calculate_final_grade(grades);
    SubjectResult {
        final_grade,
        gpa_points: grade_to_gpa(final_grade),
    }
}

/// Unweighted points plus the level bonus. Floored at 0 but not capped, so an
/// AP subject at 4.0 weighs in at 5.0.
pub fn calculate_subject_weighted_gpa(subject: &SubjectGrade) -> f64 {
    let gpa = grade_to_gpa(subject.final_grade) + subject.subject.level.bonus();
    gpa.max(0.0)
}

fn credit_weight(credits: f64) -> f64 {
    if credits.is_finite() && credits > 0.0 {
        credits
    } else {
        0.0
    }
}

fn ratio(points: f64, credits: f64) -> f64 {
    if credits > 0.0 {
        points / credits
    } else {
        0.0
    }
}

/// Credit-weighted GPA figures for one year's subjects. The `year` field is
/// left unset for the caller to stamp.
pub fn calculate_yearly_gpa(subjects: &[SubjectGrade]) -> YearlyGpa {
    let mut unweighted_points = 0.0;
    let mut weighted_points = 0.0;
    let mut core_points = 0.0;
    let mut total_credits = 0.0;
    let mut core_credits = 0.0;

    for subject in subjects {
        let credits = credit_weight(subject.subject.credits);
        let unweighted = grade_to_gpa(subject.final_grade);
        let weighted = calculate_subject_weighted_gpa(subject);

        unweighted_points += unweighted * credits;
        weighted_points += weighted * credits;
        total_credits += credits;

        if subject.subject.is_core() {
            core_points += unweighted * credits;
            core_credits += credits;
        }
    }

    YearlyGpa {
        year: None,
        unweighted: ratio(unweighted_points, total_credits),
        weighted: ratio(weighted_points, total_credits),
        core_only: ratio(core_points, core_credits),
        total_credits,
    }
}

pub fn calculate_cumulative_gpa(records: &[YearlyRecord]) -> GpaCalculation {
    calculate_cumulative_gpa_at(records, Utc::now())
}

/// Cumulative GPA across any subset of years, stamped with `calculated_at`.
///
/// Core-only figures are re-accumulated from the subjects themselves rather
/// than from each year's `core_only` ratio.
pub fn calculate_cumulative_gpa_at(
    records: &[YearlyRecord],
    calculated_at: DateTime<Utc>,
) -> GpaCalculation {
    let mut unweighted_points = 0.0;
    let mut weighted_points = 0.0;
    let mut core_points = 0.0;
    let mut total_credits = 0.0;
    let mut core_credits = 0.0;
    let mut yearly_breakdown = Vec::with_capacity(records.len());

    for record in records {
        let mut yearly = calculate_yearly_gpa(&record.subjects);
        yearly.year = Some(record.year);

        unweighted_points += yearly.unweighted * yearly.total_credits;
        weighted_points += yearly.weighted * yearly.total_credits;
        total_credits += yearly.total_credits;
        yearly_breakdown.push(yearly);

        for subject in record.subjects.iter().filter(|s| s.subject.is_core()) {
            let credits = credit_weight(subject.subject.credits);
            core_points += grade_to_gpa(subject.final_grade) * credits;
            core_credits += credits;
        }
    }

    GpaCalculation {
        unweighted: ratio(unweighted_points, total_credits),
        weighted: ratio(weighted_points, total_credits),
        core_only: ratio(core_points, core_credits),
        total_credits,
        yearly_breakdown,
        calculated_at,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{Subject, SubjectLevel, SubjectType, Year};

    pub(crate) fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    pub(crate) fn subject(
        id: &str,
        subject_type: SubjectType,
        level: SubjectLevel,
        credits: f64,
        grades: &[f64],
    ) -> SubjectGrade {
        let mut grade = SubjectGrade {
            subject: Subject {
                id: id.to_string(),
                name: id.to_string(),
                subject_type,
                level,
                credits,
            },
            grades: grades.iter().copied().map(Some).collect(),
            final_grade: 0.0,
            gpa_points: 0.0,
        };
        grade.recompute();
        grade
    }

    fn core(id: &str, credits: f64, grades: &[f64]) -> SubjectGrade {
        subject(id, SubjectType::Core, SubjectLevel::Regular, credits, grades)
    }

    #[test]
    fn final_grade_averages_everything_given() {
        assert!(approx(calculate_final_grade(&[9.0, 8.0, 10.0]), 9.0));
        assert!(approx(calculate_final_grade(&[8.0, 0.0]), 4.0));
        assert_eq!(calculate_final_grade(&[]), 0.0);
        assert_eq!(calculate_final_grade(&[f64::NAN, 7.0]), 0.0);
    }

    #[test]
    fn subject_result_composes_mean_and_mapping() {
        let result = calculate_subject_grades_and_gpa(&[6.0, 6.0, 6.0]);
        assert!(approx(result.final_grade, 6.0));
        assert_eq!(result.gpa_points, 1.0);
    }

    #[test]
    fn bonus_levels_raise_weighted_gpa() {
        let regular = subject("r", SubjectType::Core, SubjectLevel::Regular, 1.0, &[8.0]);
        let honors = subject("h", SubjectType::Core, SubjectLevel::Honors, 1.0, &[8.0]);
        let ap = subject("a", SubjectType::Core, SubjectLevel::Ap, 1.0, &[9.5]);

        assert_eq!(calculate_subject_weighted_gpa(&regular), grade_to_gpa(8.0));
        assert_eq!(calculate_subject_weighted_gpa(&honors), 3.5);
        assert_eq!(calculate_subject_weighted_gpa(&ap), 5.0);
    }

    #[test]
    fn year_gpa_is_credit_weighted() {
        let subjects = vec![core("a", 1.0, &[10.0]), core("b", 3.0, &[2.0])];
        let yearly = calculate_yearly_gpa(&subjects);
        assert!(approx(yearly.unweighted, 1.0));
        assert!(approx(yearly.total_credits, 4.0));
    }

    #[test]
    fn core_only_ignores_electives() {
        let subjects = vec![
            core("math", 1.0, &[10.0]),
            subject("art", SubjectType::Elective, SubjectLevel::Regular, 1.0, &[1.0]),
        ];
        let yearly = calculate_yearly_gpa(&subjects);
        assert!(approx(yearly.core_only, 4.0));
        assert!(approx(yearly.unweighted, 2.0));
    }

    #[test]
    fn empty_year_is_all_zero() {
        let yearly = calculate_yearly_gpa(&[]);
        assert_eq!(yearly, YearlyGpa::default());
    }

    #[test]
    fn non_positive_credits_carry_no_weight() {
        let subjects = vec![core("a", 0.0, &[10.0]), core("b", f64::NAN, &[10.0])];
        let yearly = calculate_yearly_gpa(&subjects);
        assert_eq!(yearly.unweighted, 0.0);
        assert_eq!(yearly.total_credits, 0.0);
    }

    #[test]
    fn first_year_scenario() {
        let mut math = core("math", 1.0, &[9.0, 8.0, 10.0]);
        let portuguese = core("portuguese", 1.0, &[6.0, 6.0, 6.0]);
        assert!(approx(math.final_grade, 9.0));
        assert_eq!(math.gpa_points, 4.0);
        assert_eq!(portuguese.gpa_points, 1.0);

        let yearly = calculate_yearly_gpa(&[math.clone(), portuguese.clone()]);
        assert!(approx(yearly.unweighted, 2.5));
        assert!(approx(yearly.core_only, 2.5));
        assert!(approx(yearly.weighted, 2.5));

        math.subject.level = SubjectLevel::Honors;
        let yearly = calculate_yearly_gpa(&[math, portuguese]);
        assert!(approx(yearly.weighted, 2.75));
        assert!(approx(yearly.unweighted, 2.5));
    }

    #[test]
    fn cumulative_weights_years_by_credits() {
        let records = vec![
            YearlyRecord {
                year: Year::First,
                subjects: vec![core("a", 1.0, &[10.0])],
            },
            YearlyRecord {
                year: Year::Third,
                subjects: vec![
                    core("b", 1.0, &[6.0]),
                    subject("c", SubjectType::Elective, SubjectLevel::Ap, 2.0, &[8.0]),
                ],
            },
        ];

        let calculation = calculate_cumulative_gpa(&records);
        assert_eq!(calculation.yearly_breakdown.len(), 2);
        assert_eq!(calculation.yearly_breakdown[0].year, Some(Year::First));
        assert_eq!(calculation.yearly_breakdown[1].year, Some(Year::Third));
        assert!(approx(calculation.total_credits, 4.0));
        // (4*1 + 1*1 + 3*2) / 4
        assert!(approx(calculation.unweighted, 11.0 / 4.0));
        // (4*1 + 1*1 + 4*2) / 4
        assert!(approx(calculation.weighted, 13.0 / 4.0));
        // core only: (4 + 1) / 2
        assert!(approx(calculation.core_only, 2.5));
    }

    #[test]
    fn cumulative_is_idempotent() {
        let records = vec![YearlyRecord {
            year: Year::Second,
            subjects: vec![core("a", 1.5, &[7.0, 8.5]), core("b", 1.0, &[9.1])],
        }];

        let first = calculate_cumulative_gpa(&records);
        let second = calculate_cumulative_gpa(&records);
        assert_eq!(first.unweighted, second.unweighted);
        assert_eq!(first.weighted, second.weighted);
        assert_eq!(first.core_only, second.core_only);
        assert_eq!(first.total_credits, second.total_credits);
        assert_eq!(first.yearly_breakdown, second.yearly_breakdown);
    }

    #[test]
    fn cumulative_of_nothing_is_zero() {
        let now = Utc::now();
        let calculation = calculate_cumulative_gpa_at(&[], now);
        assert_eq!(calculation.unweighted, 0.0);
        assert_eq!(calculation.core_only, 0.0);
        assert!(calculation.yearly_breakdown.is_empty());
        assert_eq!(calculation.calculated_at, now);
    }
}
