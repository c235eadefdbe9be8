use crate::models::{Subject, SubjectGrade, SubjectLevel, SubjectType, Year, YearlyRecord};

/// Core curriculum taught every year, as (slug, name).
const CORE_SUBJECTS: [(&str, &str); 12] = [
    ("lingua-portuguesa", "Língua Portuguesa"),
    ("matematica", "Matemática"),
    ("historia", "História"),
    ("geografia", "Geografia"),
    ("fisica", "Física"),
    ("quimica", "Química"),
    ("biologia", "Biologia"),
    ("lingua-inglesa", "Língua Inglesa"),
    ("educacao-fisica", "Educação Física"),
    ("artes", "Artes"),
    ("filosofia", "Filosofia"),
    ("sociologia", "Sociologia"),
];

const ELECTIVES: [(&str, &str); 8] = [
    ("espanhol", "Língua Espanhola"),
    ("frances", "Língua Francesa"),
    ("alemao", "Língua Alemã"),
    ("italiano", "Língua Italiana"),
    ("empreendedorismo", "Empreendedorismo"),
    ("robotica", "Robótica"),
    ("teatro", "Teatro"),
    ("musica", "Música"),
];

const AP_SUBJECTS: [(&str, &str); 6] = [
    ("matematica-ap", "Matemática (AP)"),
    ("fisica-ap", "Física (AP)"),
    ("quimica-ap", "Química (AP)"),
    ("biologia-ap", "Biologia (AP)"),
    ("historia-ap", "História (AP)"),
    ("ingles-ap", "Língua Inglesa (AP)"),
];

fn subject(id: String, name: &str, subject_type: SubjectType, level: SubjectLevel) -> Subject {
    Subject {
        id,
        name: name.to_string(),
        subject_type,
        level,
        credits: 1.0,
    }
}

/// The year's core subjects followed by every elective and AP subject.
pub fn subjects_for_year(year: Year) -> Vec<Subject> {
    let core = CORE_SUBJECTS.iter().map(|(slug, name)| {
        subject(
            format!("{year}-{slug}"),
            name,
            SubjectType::Core,
            SubjectLevel::Regular,
        )
    });
    let electives = ELECTIVES.iter().map(|(slug, name)| {
        subject(
            slug.to_string(),
            name,
            SubjectType::Elective,
            SubjectLevel::Regular,
        )
    });
    let ap = AP_SUBJECTS.iter().map(|(slug, name)| {
        subject(slug.to_string(), name, SubjectType::Core, SubjectLevel::Ap)
    });

    core.chain(electives).chain(ap).collect()
}

pub fn create_subject_grades(subjects: Vec<Subject>, periods: usize) -> Vec<SubjectGrade> {
    subjects
        .into_iter()
        .map(|subject| SubjectGrade::new(subject, periods))
        .collect()
}

/// One record per academic year with no grades entered.
pub fn default_records(periods: usize) -> Vec<YearlyRecord> {
    Year::ALL
        .iter()
        .map(|&year| YearlyRecord {
            year,
            subjects: create_subject_grades(subjects_for_year(year), periods),
        })
        .collect()
}
