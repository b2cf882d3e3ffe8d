use anyhow::{Context, Result};
use rusqlite::Row;
use std::path::Path;

use crate::models::{Course, CourseListing};
use crate::store::open_read_only;

const COURSE_LISTING_SQL: &str = "
SELECT
    c.course_id,
    c.name AS course_name,
    c.language,
    c.description,
    u.name AS university_name,
    u.city
FROM courses c
JOIN universities u ON c.university_id = u.university_id";

/// Every course joined with its university, in storage order.
pub fn list_courses(db_path: &Path) -> Result<Vec<CourseListing>> {
    let conn = open_read_only(db_path)?;
    let mut stmt = conn.prepare(COURSE_LISTING_SQL)?;
    let rows = stmt
        .query_map([], |row| {
            Ok(CourseListing {
                course_id: row.get("course_id")?,
                course_name: row.get("course_name")?,
                language: row.get("language")?,
                description: row.get("description")?,
                university_name: row.get("university_name")?,
                city: row.get("city")?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("Failed to read course listing")?;
    Ok(rows)
}

/// Courses in storage order; the input of the embedding index build.
pub fn list_course_documents(db_path: &Path) -> Result<Vec<Course>> {
    let conn = open_read_only(db_path)?;
    let mut stmt = conn.prepare(
        "SELECT course_id, university_id, name, language, description FROM courses",
    )?;
    let rows = stmt
        .query_map([], course_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("Failed to read courses")?;
    Ok(rows)
}

fn course_from_row(row: &Row<'_>) -> rusqlite::Result<Course> {
    Ok(Course {
        course_id: row.get(0)?,
        university_id: row.get(1)?,
        name: row.get(2)?,
        language: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        description: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::seed;

    struct University {
        university_id: i64,
        name: String,
        city: String,
    }

    struct Requirement {
        course_id: i64,
        required_grade: f64,
        language_level: String,
    }

    fn universities(db_path: &Path) -> Vec<University> {
        let conn = open_read_only(db_path).unwrap();
        let mut stmt = conn
            .prepare("SELECT university_id, name, city FROM universities")
            .unwrap();
        stmt.query_map([], |row| {
            Ok(University {
                university_id: row.get(0)?,
                name: row.get(1)?,
                city: row.get(2)?,
            })
        })
        .unwrap()
        .collect::<rusqlite::Result<Vec<_>>>()
        .unwrap()
    }

    fn requirements(db_path: &Path) -> Vec<Requirement> {
        let conn = open_read_only(db_path).unwrap();
        let mut stmt = conn
            .prepare("SELECT course_id, required_grade, language_level FROM requirements")
            .unwrap();
        stmt.query_map([], |row| {
            Ok(Requirement {
                course_id: row.get(0)?,
                required_grade: row.get(1)?,
                language_level: row.get(2)?,
            })
        })
        .unwrap()
        .collect::<rusqlite::Result<Vec<_>>>()
        .unwrap()
    }

    fn seeded() -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("universities.db");
        seed::create_database(&path).unwrap();
        (dir, path)
    }

    #[test]
    fn test_list_courses_one_row_per_course() {
        let (_dir, path) = seeded();
        let courses = list_courses(&path).unwrap();
        assert_eq!(courses.len(), seed::COURSES.len());
        assert_eq!(courses[0].course_name, "B.Sc. Informatik");
        assert_eq!(
            courses[0].university_name,
            "Technische Universität München (TUM)"
        );
        assert_eq!(courses[0].city.as_deref(), Some("München"));
    }

    #[test]
    fn test_list_courses_missing_table_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blank.db");
        rusqlite::Connection::open(&path)
            .unwrap()
            .execute_batch("CREATE TABLE unrelated (id INTEGER)")
            .unwrap();

        let err = list_courses(&path).unwrap_err();
        assert!(format!("{err:#}").contains("courses"));
    }

    #[test]
    fn test_list_course_documents_carries_descriptions() {
        let (_dir, path) = seeded();
        let docs = list_course_documents(&path).unwrap();
        assert_eq!(docs.len(), 14);
        assert_eq!(docs[2].name, "M.Sc. Data Science");
        assert!(docs[2].description.contains("machine learning"));
    }

    #[test]
    fn test_listing_matches_referenced_university() {
        let (_dir, path) = seeded();
        let universities = universities(&path);
        assert_eq!(universities.len(), 11);
        let courses = list_course_documents(&path).unwrap();

        for row in list_courses(&path).unwrap() {
            let course = courses.iter().find(|c| c.course_id == row.course_id).unwrap();
            let university = universities
                .iter()
                .find(|u| u.university_id == course.university_id)
                .unwrap();
            assert_eq!(row.university_name, university.name);
            assert_eq!(row.city.as_deref(), Some(university.city.as_str()));
        }
    }

    #[test]
    fn test_requirements_reference_existing_courses() {
        let (_dir, path) = seeded();
        let courses = list_course_documents(&path).unwrap();
        let requirements = requirements(&path);
        assert_eq!(requirements.len(), courses.len());
        for req in requirements {
            assert!(courses.iter().any(|c| c.course_id == req.course_id));
            assert!((1.0..=4.0).contains(&req.required_grade));
            assert!(["B2", "C1", "C2"].contains(&req.language_level.as_str()));
        }
    }
}
