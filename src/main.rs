use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use pondera_gpa::config::{GradingSystem, Settings, DEFAULT_CONFIG_FILE};
use pondera_gpa::gradebook::Gradebook;
use pondera_gpa::grading::{self, GradeScale};
use pondera_gpa::models::{Student, SubjectLevel, SubjectType, Year};
use pondera_gpa::{report, store};

#[derive(Parser)]
#[command(name = "pondera")]
#[command(about = "Convert Brazilian high-school grades into a U.S. GPA", long_about = None)]
struct Cli {
    /// Settings file
    #[arg(long, global = true, env = "PONDERA_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum TypeArg {
    Core,
    Elective,
}

impl From<TypeArg> for SubjectType {
    fn from(value: TypeArg) -> Self {
        match value {
            TypeArg::Core => SubjectType::Core,
            TypeArg::Elective => SubjectType::Elective,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum LevelArg {
    Regular,
    Honors,
    Ap,
}

impl From<LevelArg> for SubjectLevel {
    fn from(value: LevelArg) -> Self {
        match value {
            LevelArg::Regular => SubjectLevel::Regular,
            LevelArg::Honors => SubjectLevel::Honors,
            LevelArg::Ap => SubjectLevel::Ap,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create a gradebook with the default subject catalog
    Init {
        #[arg(long, default_value = "gradebook.json")]
        out: PathBuf,
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long)]
        school: Option<String>,
        #[arg(long)]
        graduation_year: Option<i32>,
        /// Overrides the grading system from the settings file
        #[arg(long)]
        grading_system: Option<GradingSystem>,
        /// Overrides the grade scale from the settings file
        #[arg(long)]
        grade_scale: Option<GradeScale>,
    },
    /// Import subjects and grades from a CSV file
    Import {
        #[arg(long, default_value = "gradebook.json")]
        gradebook: PathBuf,
        #[arg(long)]
        csv: PathBuf,
    },
    /// Enter one period grade on the gradebook's scale
    SetGrade {
        #[arg(long, default_value = "gradebook.json")]
        gradebook: PathBuf,
        #[arg(long, value_parser = parse_year)]
        year: Year,
        #[arg(long)]
        subject: String,
        /// Period number, starting at 1
        #[arg(long)]
        period: usize,
        #[arg(long)]
        value: f64,
    },
    /// Add a custom subject to one year
    AddSubject {
        #[arg(long, default_value = "gradebook.json")]
        gradebook: PathBuf,
        #[arg(long, value_parser = parse_year)]
        year: Year,
        #[arg(long)]
        name: String,
        #[arg(long, value_enum, default_value_t = TypeArg::Core)]
        subject_type: TypeArg,
        #[arg(long, value_enum, default_value_t = LevelArg::Regular)]
        level: LevelArg,
        #[arg(long, default_value_t = 1.0)]
        credits: f64,
    },
    /// Remove a subject from one year
    RemoveSubject {
        #[arg(long, default_value = "gradebook.json")]
        gradebook: PathBuf,
        #[arg(long, value_parser = parse_year)]
        year: Year,
        #[arg(long)]
        subject: String,
    },
    /// Calculate cumulative and yearly GPA
    Calculate {
        #[arg(long, default_value = "gradebook.json")]
        gradebook: PathBuf,
        /// Print the full calculation as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate a markdown report
    Report {
        #[arg(long, default_value = "gradebook.json")]
        gradebook: PathBuf,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Convert a single grade to GPA points
    Convert {
        #[arg(allow_negative_numbers = true)]
        grade: f64,
        #[arg(long, default_value = "0-10")]
        scale: GradeScale,
    },
}

fn parse_year(value: &str) -> Result<Year, String> {
    let number: u8 = value
        .parse()
        .map_err(|_| format!("'{value}' is not a year number"))?;
    Year::try_from(number)
}

fn open(path: &Path, settings: &Settings) -> anyhow::Result<Gradebook> {
    let mut gradebook = store::load(path)
        .with_context(|| format!("failed to load gradebook {}", path.display()))?;
    gradebook.apply_settings(settings);
    Ok(gradebook)
}

fn save(gradebook: &Gradebook, path: &Path) -> anyhow::Result<()> {
    store::save(gradebook, path)
        .with_context(|| format!("failed to save gradebook {}", path.display()))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let settings = Settings::load(&cli.config)
        .with_context(|| format!("failed to read settings {}", cli.config.display()))?;
    let places = settings.display.decimal_places;

    match cli.command {
        Commands::Init {
            out,
            name,
            school,
            graduation_year,
            grading_system,
            grade_scale,
        } => {
            let mut student = Student {
                name,
                school,
                ..Student::default()
            };
            if let Some(year) = graduation_year {
                student.graduation_year = year;
            }

            let mut gradebook = Gradebook::from_settings(student, &settings);
            if let Some(system) = grading_system {
                gradebook.set_grading_system(system);
            }
            if let Some(scale) = grade_scale {
                gradebook.set_grade_scale(scale);
            }
            save(&gradebook, &out)?;
            println!("Gradebook written to {}.", out.display());
        }
        Commands::Import { gradebook: path, csv } => {
            let mut gradebook = open(&path, &settings)?;
            let summary = store::import_csv(&mut gradebook, &csv)
                .with_context(|| format!("failed to import {}", csv.display()))?;
            save(&gradebook, &path)?;
            println!(
                "Imported {} subjects and {} grades from {} ({} rejected).",
                summary.subjects,
                summary.grades_applied,
                csv.display(),
                summary.grades_rejected
            );
        }
        Commands::SetGrade {
            gradebook: path,
            year,
            subject,
            period,
            value,
        } => {
            let mut gradebook = open(&path, &settings)?;
            let index = period.checked_sub(1).context("periods start at 1")?;
            gradebook.set_grade(year, &subject, index, value)?;
            save(&gradebook, &path)?;

            if let Some(grade) = gradebook
                .record(year)
                .and_then(|r| r.subjects.iter().find(|g| g.subject.id == subject))
            {
                println!(
                    "{}: final grade {:.*}, GPA points {:.1}",
                    grade.subject.name, places, grade.final_grade, grade.gpa_points
                );
            }
        }
        Commands::AddSubject {
            gradebook: path,
            year,
            name,
            subject_type,
            level,
            credits,
        } => {
            let mut gradebook = open(&path, &settings)?;
            let id = gradebook.add_custom_subject(
                year,
                &name,
                subject_type.into(),
                level.into(),
                credits,
            )?;
            save(&gradebook, &path)?;
            println!("Added {name} to year {year} as {id}.");
        }
        Commands::RemoveSubject {
            gradebook: path,
            year,
            subject,
        } => {
            let mut gradebook = open(&path, &settings)?;
            let removed = gradebook.remove_subject(year, &subject)?;
            save(&gradebook, &path)?;
            println!("Removed {} from year {year}.", removed.subject.name);
        }
        Commands::Calculate {
            gradebook: path,
            json,
        } => {
            let mut gradebook = open(&path, &settings)?;
            let calculation = gradebook.calculate()?;

            if json {
                println!("{}", serde_json::to_string_pretty(&calculation)?);
                return Ok(());
            }

            let classification = grading::gpa_classification(calculation.unweighted);
            println!(
                "Unweighted {:.*} | Weighted {:.*} | Core only {:.*} | Credits {}",
                places,
                calculation.unweighted,
                places,
                calculation.weighted,
                places,
                calculation.core_only,
                calculation.total_credits
            );
            println!(
                "{} {} ({})",
                classification.icon, classification.label, classification.description
            );
            for yearly in &calculation.yearly_breakdown {
                if let Some(year) = yearly.year {
                    println!(
                        "- Year {year}: unweighted {:.*}, weighted {:.*}, core only {:.*}",
                        places, yearly.unweighted, places, yearly.weighted, places, yearly.core_only
                    );
                }
            }
        }
        Commands::Report {
            gradebook: path,
            out,
        } => {
            let mut gradebook = open(&path, &settings)?;
            let calculation = gradebook.calculate()?;
            let report = report::build_report(&gradebook, &calculation, &settings);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Convert { grade, scale } => {
            let valid = grading::validate_grade(grade, scale);
            let points = match scale.max() {
                Some(max) => grading::grade_to_gpa_on_scale(grade, max),
                None => grading::grade_to_gpa(grade),
            };
            let classification = grading::gpa_classification(points);
            println!(
                "{grade} on the {scale} scale: {points:.1} GPA points, {} ({}){}",
                classification.label,
                classification.description,
                if valid { "" } else { " [out of range]" }
            );
        }
    }

    Ok(())
}
