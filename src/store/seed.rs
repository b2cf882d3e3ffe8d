//! Built-in catalog of German universities and their courses.

use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use std::path::Path;

use crate::store::schema;

/// (name, city, state)
pub const UNIVERSITIES: &[(&str, &str, &str)] = &[
    ("Technische Universität München (TUM)", "München", "Bayern"),
    ("Ludwig-Maximilians-Universität München (LMU)", "München", "Bayern"),
    (
        "Rheinisch-Westfälische Technische Hochschule Aachen (RWTH)",
        "Aachen",
        "Nordrhein-Westfalen",
    ),
    ("Freie Universität Berlin (FU Berlin)", "Berlin", "Berlin"),
    ("Humboldt-Universität zu Berlin (HU Berlin)", "Berlin", "Berlin"),
    ("Karlsruher Institut für Technologie (KIT)", "Karlsruhe", "Baden-Württemberg"),
    ("Universität Heidelberg", "Heidelberg", "Baden-Württemberg"),
    ("Technische Universität Berlin (TU Berlin)", "Berlin", "Berlin"),
    ("Universität Hamburg", "Hamburg", "Hamburg"),
    ("Goethe-Universität Frankfurt am Main", "Frankfurt", "Hessen"),
    ("Technische Universität Darmstadt", "Darmstadt", "Hessen"),
];

/// (university_id, name, language, description)
pub const COURSES: &[(i64, &str, &str, &str)] = &[
    (1, "B.Sc. Informatik", "German", "Ein fundamentaler Kurs, der alle Aspekte der modernen Informatik abdeckt, von Software-Engineering bis hin zu KI."),
    (1, "B.Sc. Maschinenbau", "German", "Klassischer Maschinenbau mit Fokus auf Robotik, Fahrzeugtechnik und Produktion."),
    (1, "M.Sc. Data Science", "English", "An advanced, English-taught program focusing on machine learning, big data, and statistical analysis."),
    (2, "B.A. Betriebswirtschaftslehre (BWL)", "German", "Ein umfassendes BWL-Studium mit Schwerpunkten in Finanzen und Marketing."),
    (2, "M.Sc. Physics", "English", "Covers theoretical and experimental physics, with options to specialize in astrophysics or quantum mechanics."),
    (3, "B.Sc. Elektrotechnik", "German", "Fokussiert auf Informationstechnik und Mikroelektronik."),
    (3, "M.Sc. Automotive Engineering", "English", "A world-renowned program for automotive systems, connected driving, and e-mobility."),
    (4, "B.A. Politikwissenschaft", "German", "Analyse von politischen Systemen, internationalen Beziehungen und politischer Theorie."),
    (5, "B.Sc. Biologie", "German", "Umfassende Ausbildung in Molekularbiologie, Ökologie und Genetik."),
    (6, "B.Sc. Wirtschaftsingenieurwesen", "German", "Eine interdisziplinäre Ausbildung, die Ingenieurwesen mit Betriebswirtschaft verbindet."),
    (7, "B.A. Medizin (Modellstudiengang)", "German", "Innovatives Medizinstudium mit starkem Praxisbezug ab dem ersten Semester."),
    (8, "M.Sc. Computer Science", "English", "International master's program with a focus on data analytics and human-computer interaction."),
    (9, "M.Sc. International Business and Economics", "English", "A program designed for understanding global markets and economic policies."),
    (10, "B.Sc. Rechtswissenschaften (Jura)", "German", "Das klassische Jurastudium, das auf das erste Staatsexamen vorbereitet."),
];

/// (course_id, required_grade, language_level)
pub const REQUIREMENTS: &[(i64, f64, &str)] = &[
    (1, 2.0, "C1"),
    (2, 2.5, "C1"),
    (3, 1.7, "C1"),
    (4, 2.3, "C1"),
    (5, 1.9, "C1"),
    (6, 2.4, "C1"),
    (7, 1.3, "C1"),
    (8, 2.1, "C1"),
    (9, 2.2, "C1"),
    (10, 2.8, "C1"),
    (11, 1.2, "C1"),
    (12, 1.8, "C1"),
    (13, 2.0, "C1"),
    (14, 2.5, "C1"),
];

/// Row counts written by a seeding run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub universities: usize,
    pub courses: usize,
    pub requirements: usize,
}

/// Recreate the database at `path` from the built-in catalog.
///
/// An existing file is removed first. All rows are inserted in one
/// transaction; on failure nothing is committed.
pub fn create_database(path: &Path) -> Result<SeedSummary> {
    if path.exists() {
        std::fs::remove_file(path)
            .with_context(|| format!("Failed to remove old database {}", path.display()))?;
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut conn = Connection::open(path)
        .with_context(|| format!("Failed to create database {}", path.display()))?;
    schema::create_tables(&conn)?;

    let summary = insert_catalog(&mut conn)?;
    tracing::info!(
        "Seeded {} universities, {} courses, {} requirements into {}",
        summary.universities,
        summary.courses,
        summary.requirements,
        path.display()
    );
    Ok(summary)
}

fn insert_catalog(conn: &mut Connection) -> Result<SeedSummary> {
    let tx = conn.transaction()?;
    {
        let mut stmt =
            tx.prepare("INSERT INTO universities (name, city, state) VALUES (?1, ?2, ?3)")?;
        for (name, city, state) in UNIVERSITIES {
            stmt.execute(params![name, city, state])?;
        }

        let mut stmt = tx.prepare(
            "INSERT INTO courses (university_id, name, language, description) VALUES (?1, ?2, ?3, ?4)",
        )?;
        for (university_id, name, language, description) in COURSES {
            stmt.execute(params![university_id, name, language, description])
                .with_context(|| format!("Failed to insert course {name}"))?;
        }

        let mut stmt = tx.prepare(
            "INSERT INTO requirements (course_id, required_grade, language_level) VALUES (?1, ?2, ?3)",
        )?;
        for (course_id, required_grade, language_level) in REQUIREMENTS {
            stmt.execute(params![course_id, required_grade, language_level])?;
        }
    }
    tx.commit().context("Failed to commit seed data")?;

    Ok(SeedSummary {
        universities: UNIVERSITIES.len(),
        courses: COURSES.len(),
        requirements: REQUIREMENTS.len(),
    })
}
