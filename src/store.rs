use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{GradebookError, Result};
use crate::gradebook::Gradebook;
use crate::models::{Subject, SubjectLevel, SubjectType, Year};

pub fn load(path: &Path) -> Result<Gradebook> {
    let contents = std::fs::read_to_string(path)?;
    let mut gradebook: Gradebook = serde_json::from_str(&contents)?;
    gradebook.rederive();
    info!(path = %path.display(), "loaded gradebook");
    Ok(gradebook)
}

pub fn save(gradebook: &Gradebook, path: &Path) -> Result<()> {
    let contents = serde_json::to_string_pretty(gradebook)?;
    std::fs::write(path, contents)?;
    info!(path = %path.display(), "saved gradebook");
    Ok(())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub subjects: usize,
    pub grades_applied: usize,
    pub grades_rejected: usize,
}

#[derive(Deserialize)]
struct CsvRow {
    year: u8,
    subject_id: String,
    name: String,
    #[serde(rename = "type")]
    subject_type: SubjectType,
    #[serde(default)]
    level: SubjectLevel,
    credits: f64,
    #[serde(default)]
    p1: Option<f64>,
    #[serde(default)]
    p2: Option<f64>,
    #[serde(default)]
    p3: Option<f64>,
}

/// Imports subjects and grades from a CSV file with the header
/// `year,subject_id,name,type,level,credits,p1,p2,p3`.
pub fn import_csv(gradebook: &mut Gradebook, csv_path: &Path) -> Result<ImportSummary> {
    let reader = csv::Reader::from_path(csv_path)?;
    let summary = import_rows(gradebook, reader)?;
    info!(
        path = %csv_path.display(),
        subjects = summary.subjects,
        applied = summary.grades_applied,
        rejected = summary.grades_rejected,
        "imported grades"
    );
    Ok(summary)
}

/// Empty period cells mean "not entered" and leave the stored grade alone.
/// Grades the gradebook rejects are skipped and counted; malformed rows abort
/// the import.
pub fn import_rows<R: std::io::Read>(
    gradebook: &mut Gradebook,
    mut reader: csv::Reader<R>,
) -> Result<ImportSummary> {
    let mut summary = ImportSummary::default();

    for (index, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result?;
        let line = index + 2;
        let year = Year::try_from(row.year)
            .map_err(|message| GradebookError::CsvRow { row: line, message })?;

        gradebook.upsert_subject(
            year,
            Subject {
                id: row.subject_id.clone(),
                name: row.name,
                subject_type: row.subject_type,
                level: row.level,
                credits: row.credits,
            },
        )?;
        summary.subjects += 1;

        for (period, value) in [row.p1, row.p2, row.p3].into_iter().enumerate() {
            let Some(value) = value else {
                continue;
            };

            match gradebook.set_grade(year, &row.subject_id, period, value) {
                Ok(()) => summary.grades_applied += 1,
                Err(
                    err @ (GradebookError::InvalidGrade { .. }
                    | GradebookError::PeriodOutOfRange { .. }),
                ) => {
                    warn!(line, subject = %row.subject_id, period, %err, "skipping grade");
                    summary.grades_rejected += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GradingSystem;
    use crate::grading::GradeScale;
    use crate::models::Student;

    fn gradebook(system: GradingSystem) -> Gradebook {
        Gradebook::new(Student::default(), system, GradeScale::ZeroToTen)
    }

    fn reader(data: &str) -> csv::Reader<&[u8]> {
        csv::Reader::from_reader(data.as_bytes())
    }

    #[test]
    fn imports_known_and_new_subjects() {
        let mut book = gradebook(GradingSystem::Trimestral);
        let data = "\
year,subject_id,name,type,level,credits,p1,p2,p3
1,1-matematica,Matemática,core,honors,1,9,8,10
1,1-lingua-portuguesa,Língua Portuguesa,core,regular,1,6,6,6
2,custom-astro,Astronomia,elective,ap,2,7.5,,
";
        let summary = import_rows(&mut book, reader(data)).unwrap();
        assert_eq!(summary.subjects, 3);
        assert_eq!(summary.grades_applied, 7);
        assert_eq!(summary.grades_rejected, 0);

        let calculation = book.calculate().unwrap();
        let first = calculation.yearly_breakdown[0];
        assert!((first.unweighted - 2.5).abs() < 1e-9);
        assert!((first.weighted - 2.75).abs() < 1e-9);

        let astro = book
            .record(Year::Second)
            .unwrap()
            .subjects
            .iter()
            .find(|g| g.subject.id == "custom-astro")
            .unwrap();
        assert_eq!(astro.grades, vec![Some(7.5), None, None]);
        assert_eq!(astro.subject.level, SubjectLevel::Ap);
    }

    #[test]
    fn skips_out_of_range_cells() {
        let mut book = gradebook(GradingSystem::Semestral);
        let data = "\
year,subject_id,name,type,level,credits,p1,p2,p3
3,3-artes,Artes,core,regular,1,12,7,9
";
        let summary = import_rows(&mut book, reader(data)).unwrap();
        assert_eq!(summary.grades_applied, 1);
        assert_eq!(summary.grades_rejected, 2);
    }

    #[test]
    fn rejects_unknown_year() {
        let mut book = gradebook(GradingSystem::Annual);
        let data = "\
year,subject_id,name,type,level,credits,p1
4,x,X,core,regular,1,5
";
        let err = import_rows(&mut book, reader(data)).unwrap_err();
        assert!(matches!(err, GradebookError::CsvRow { row: 2, .. }));
    }

    #[test]
    fn snapshot_round_trip_rederives_subjects() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gradebook.json");

        let mut book = gradebook(GradingSystem::Trimestral);
        book.student.name = "Ana Souza".to_string();
        book.set_grade(Year::First, "1-matematica", 0, 9.0).unwrap();
        save(&book, &path).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let tampered = raw.replacen("\"final_grade\": 9.0", "\"final_grade\": 2.0", 1);
        std::fs::write(&path, tampered).unwrap();

        let mut loaded = load(&path).unwrap();
        assert_eq!(loaded.student.name, "Ana Souza");
        let math = &loaded.record(Year::First).unwrap().subjects[1];
        assert_eq!(math.final_grade, 9.0);
        assert_eq!(math.grades, vec![Some(9.0), None, None]);
        assert_eq!(loaded.calculate().unwrap().unweighted, 4.0);
    }
}
