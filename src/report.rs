use std::fmt::Write;

use crate::config::Settings;
use crate::gradebook::Gradebook;
use crate::grading::gpa_classification;
use crate::metrics::{self, YearFilter};
use crate::models::GpaCalculation;

pub fn build_report(gradebook: &Gradebook, calculation: &GpaCalculation, settings: &Settings) -> String {
    let places = settings.display.decimal_places;
    let student = &gradebook.student;
    let mut output = String::new();

    let _ = writeln!(output, "# GPA Report");
    let _ = writeln!(
        output,
        "Student: {} | School: {} | Graduation: {}",
        if student.name.is_empty() { "not provided" } else { student.name.as_str() },
        student.school.as_deref().unwrap_or("not provided"),
        student.graduation_year
    );
    let _ = writeln!(
        output,
        "Calculated at {} ({} grading, {} scale)",
        calculation.calculated_at.to_rfc3339(),
        gradebook.grading_system().as_str(),
        gradebook.grade_scale()
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Cumulative GPA");

    let classification = gpa_classification(calculation.unweighted);
    let _ = writeln!(
        output,
        "- Unweighted: {:.*} ({} {}, {})",
        places,
        calculation.unweighted,
        classification.icon,
        classification.label,
        classification.description
    );
    let _ = writeln!(output, "- Weighted: {:.*}", places, calculation.weighted);
    let _ = writeln!(output, "- Core only: {:.*}", places, calculation.core_only);
    let _ = writeln!(output, "- Credits: {}", calculation.total_credits);

    if settings.targets.enable_goal_tracking {
        let progress = settings.targets.evaluate(calculation.unweighted);
        let _ = writeln!(output);
        let _ = writeln!(output, "## Goals");
        if progress.meets_target {
            let _ = writeln!(
                output,
                "Target GPA {:.*} reached.",
                places, settings.targets.target_gpa
            );
        } else {
            let _ = writeln!(
                output,
                "{:.*} points short of the {:.*} target.",
                places, progress.to_target, places, settings.targets.target_gpa
            );
        }
        if !progress.meets_minimum {
            let _ = writeln!(
                output,
                "Below the minimum GPA of {:.*}.",
                places, settings.targets.minimum_gpa
            );
        }
        if progress.meets_dream {
            let _ = writeln!(output, "Dream GPA reached.");
        }
    }

    let distribution = metrics::subject_distribution(gradebook.records(), YearFilter::All);
    let _ = writeln!(output);
    let _ = writeln!(output, "## Average Grade by Group");
    for (label, group) in [
        ("Core", distribution.core),
        ("Elective", distribution.elective),
        ("Regular", distribution.regular),
        ("Honors", distribution.honors),
        ("AP", distribution.ap),
    ] {
        if group.count > 0 {
            let _ = writeln!(
                output,
                "- {label}: {:.*} across {} subjects ({} credits)",
                places, group.avg_grade, group.count, group.credits
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Yearly Breakdown");

    for yearly in &calculation.yearly_breakdown {
        let Some(year) = yearly.year else {
            continue;
        };
        let _ = writeln!(output);
        let _ = writeln!(output, "### Year {year}");
        let _ = writeln!(
            output,
            "- Unweighted {:.*} | Weighted {:.*} | Core only {:.*} | Credits {}",
            places, yearly.unweighted, places, yearly.weighted, places, yearly.core_only, yearly.total_credits
        );

        let (Some(record), Some(annual)) = (gradebook.record(year), gradebook.annual_metrics(year))
        else {
            continue;
        };
        let _ = writeln!(
            output,
            "- {} of {} subjects graded ({:.0}%), average grade {:.*}",
            annual.completed_subjects, annual.total_subjects, annual.completion_rate, places, annual.avg_grade
        );

        let mut graded: Vec<_> = record
            .subjects
            .iter()
            .filter(|grade| grade.has_entered_grades())
            .collect();
        graded.sort_by(|a, b| b.final_grade.total_cmp(&a.final_grade));

        if graded.is_empty() {
            let _ = writeln!(output, "No grades entered for this year.");
        }
        for grade in graded {
            let _ = writeln!(
                output,
                "- {} ({:?}, {:?}): final {:.*}, GPA points {:.1}",
                grade.subject.name,
                grade.subject.subject_type,
                grade.subject.level,
                places,
                grade.final_grade,
                grade.gpa_points
            );
        }
    }

    output
}
