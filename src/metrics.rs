use serde::Serialize;

use crate::models::{SubjectLevel, SubjectType, Year, YearlyRecord};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnualPerformanceMetrics {
    pub avg_grade: f64,
    pub avg_gpa: f64,
    pub completed_subjects: usize,
    pub total_subjects: usize,
    pub earned_credits: f64,
    pub total_credits: f64,
    pub excellent_grades: usize,
    pub good_grades: usize,
    pub average_grades: usize,
    pub poor_grades: usize,
    pub completion_rate: f64,
}

/// Summary of one year. A subject counts as completed once any period grade
/// has been entered, a scored zero included; averages are simple means over
/// completed subjects.
pub fn annual_performance_metrics(record: &YearlyRecord) -> AnnualPerformanceMetrics {
    let completed: Vec<_> = record
        .subjects
        .iter()
        .filter(|s| s.has_entered_grades())
        .collect();

    let total_credits: f64 = record.subjects.iter().map(|s| s.subject.credits).sum();
    let earned_credits: f64 = completed.iter().map(|s| s.subject.credits).sum();
    let (avg_grade, avg_gpa) = if completed.is_empty() {
        (0.0, 0.0)
    } else {
        let count = completed.len() as f64;
        (
            completed.iter().map(|s| s.final_grade).sum::<f64>() / count,
            completed.iter().map(|s| s.gpa_points).sum::<f64>() / count,
        )
    };

    let mut metrics = AnnualPerformanceMetrics {
        avg_grade,
        avg_gpa,
        completed_subjects: completed.len(),
        total_subjects: record.subjects.len(),
        earned_credits,
        total_credits,
        excellent_grades: 0,
        good_grades: 0,
        average_grades: 0,
        poor_grades: 0,
        completion_rate: if record.subjects.is_empty() {
            0.0
        } else {
            completed.len() as f64 / record.subjects.len() as f64 * 100.0
        },
    };

    for subject in &completed {
        match subject.final_grade {
            g if g >= 9.0 => metrics.excellent_grades += 1,
            g if g >= 7.0 => metrics.good_grades += 1,
            g if g >= 6.0 => metrics.average_grades += 1,
            _ => metrics.poor_grades += 1,
        }
    }

    metrics
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearFilter {
    All,
    Only(Year),
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct GroupSummary {
    pub avg_grade: f64,
    pub credits: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SubjectDistribution {
    pub core: GroupSummary,
    pub elective: GroupSummary,
    pub regular: GroupSummary,
    pub honors: GroupSummary,
    pub ap: GroupSummary,
}

#[derive(Default)]
struct Accumulator {
    total: f64,
    credits: f64,
    count: usize,
}

impl Accumulator {
    fn add(&mut self, grade: f64, credits: f64) {
        self.total += grade;
        self.credits += credits;
        self.count += 1;
    }

    fn finish(&self) -> GroupSummary {
        GroupSummary {
            avg_grade: if self.count == 0 {
                0.0
            } else {
                self.total / self.count as f64
            },
            credits: self.credits,
            count: self.count,
        }
    }
}

/// Average final grade and credits of subjects with an entered grade, grouped
/// by type and by level.
pub fn subject_distribution(records: &[YearlyRecord], filter: YearFilter) -> SubjectDistribution {
    let mut by_type: [Accumulator; 2] = Default::default();
    let mut by_level: [Accumulator; 3] = Default::default();

    let selected = records.iter().filter(|record| match filter {
        YearFilter::All => true,
        YearFilter::Only(year) => record.year == year,
    });

    for record in selected {
        for grade in record.subjects.iter().filter(|s| s.has_entered_grades()) {
            let type_index = match grade.subject.subject_type {
                SubjectType::Core => 0,
                SubjectType::Elective => 1,
            };
            let level_index = match grade.subject.level {
                SubjectLevel::Regular => 0,
                SubjectLevel::Honors => 1,
                SubjectLevel::Ap => 2,
            };
            by_type[type_index].add(grade.final_grade, grade.subject.credits);
            by_level[level_index].add(grade.final_grade, grade.subject.credits);
        }
    }

    SubjectDistribution {
        core: by_type[0].finish(),
        elective: by_type[1].finish(),
        regular: by_level[0].finish(),
        honors: by_level[1].finish(),
        ap: by_level[2].finish(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpa::tests::{approx, subject};

    fn sample_record(year: Year) -> YearlyRecord {
        YearlyRecord {
            year,
            subjects: vec![
                subject("math", SubjectType::Core, SubjectLevel::Regular, 1.0, &[9.5]),
                subject("bio", SubjectType::Core, SubjectLevel::Ap, 2.0, &[7.0]),
                subject("music", SubjectType::Elective, SubjectLevel::Regular, 1.0, &[6.5]),
                subject("drama", SubjectType::Elective, SubjectLevel::Honors, 1.0, &[4.0]),
                subject("french", SubjectType::Elective, SubjectLevel::Regular, 1.0, &[]),
            ],
        }
    }

    #[test]
    fn annual_metrics_count_completed_subjects() {
        let metrics = annual_performance_metrics(&sample_record(Year::First));
        assert_eq!(metrics.completed_subjects, 4);
        assert_eq!(metrics.total_subjects, 5);
        assert!(approx(metrics.total_credits, 6.0));
        assert!(approx(metrics.earned_credits, 5.0));
        assert!(approx(metrics.avg_grade, (9.5 + 7.0 + 6.5 + 4.0) / 4.0));
        assert!(approx(metrics.avg_gpa, (4.0 + 2.0 + 1.0 + 0.0) / 4.0));
        assert_eq!(metrics.excellent_grades, 1);
        assert_eq!(metrics.good_grades, 1);
        assert_eq!(metrics.average_grades, 1);
        assert_eq!(metrics.poor_grades, 1);
        assert!(approx(metrics.completion_rate, 80.0));
    }

    #[test]
    fn scored_zero_counts_as_completed() {
        let record = YearlyRecord {
            year: Year::First,
            subjects: vec![
                subject("math", SubjectType::Core, SubjectLevel::Regular, 1.0, &[10.0]),
                subject("history", SubjectType::Core, SubjectLevel::Regular, 1.0, &[0.0]),
                subject("art", SubjectType::Elective, SubjectLevel::Regular, 1.0, &[]),
            ],
        };

        let metrics = annual_performance_metrics(&record);
        assert_eq!(metrics.completed_subjects, 2);
        assert_eq!(metrics.poor_grades, 1);
        assert!(approx(metrics.earned_credits, 2.0));
        assert!(approx(metrics.avg_grade, 5.0));
        assert!(approx(metrics.avg_gpa, 2.0));

        let distribution = subject_distribution(&[record], YearFilter::All);
        assert_eq!(distribution.core.count, 2);
        assert!(approx(distribution.core.avg_grade, 5.0));
        assert_eq!(distribution.elective.count, 0);
    }

    #[test]
    fn annual_metrics_on_empty_year() {
        let metrics = annual_performance_metrics(&YearlyRecord {
            year: Year::Second,
            subjects: Vec::new(),
        });
        assert_eq!(metrics.completed_subjects, 0);
        assert_eq!(metrics.avg_grade, 0.0);
        assert_eq!(metrics.completion_rate, 0.0);
    }

    #[test]
    fn distribution_groups_by_type_and_level() {
        let records = vec![sample_record(Year::First), sample_record(Year::Second)];

        let all = subject_distribution(&records, YearFilter::All);
        assert_eq!(all.core.count, 4);
        assert!(approx(all.core.avg_grade, 8.25));
        assert!(approx(all.core.credits, 6.0));
        assert_eq!(all.elective.count, 4);
        assert_eq!(all.honors.count, 2);
        assert!(approx(all.ap.avg_grade, 7.0));

        let first = subject_distribution(&records, YearFilter::Only(Year::First));
        assert_eq!(first.core.count, 2);
        assert!(approx(first.regular.avg_grade, 8.0));

        let third = subject_distribution(&records, YearFilter::Only(Year::Third));
        assert_eq!(third, SubjectDistribution::default());
    }
}
