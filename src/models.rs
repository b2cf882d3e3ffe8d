use serde::{Deserialize, Serialize};

/// A course offered by exactly one university
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub course_id: i64,
    pub university_id: i64,
    pub name: String,
    pub language: String,
    pub description: String,
}

/// One row of `GET /courses`: a course flattened with its university
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseListing {
    pub course_id: i64,
    pub course_name: String,
    pub language: Option<String>,
    pub description: Option<String>,
    pub university_name: String,
    pub city: Option<String>,
}

/// `GET /courses` body. Storage failures are reported inside a normal
/// response as `{"error": "..."}`.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum CoursesResponse {
    Courses(Vec<CourseListing>),
    Error { error: String },
}

/// Metadata stored with every course embedding and returned by recommendations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseMetadata {
    pub course_name: String,
}

/// Query string of `GET /recommend_courses`
#[derive(Debug, Clone, Deserialize)]
pub struct RecommendQuery {
    pub query: String,
}

/// Body of `POST /predict_chances`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdmissionQuery {
    pub grade: f64,
    pub language_level: String,
}

/// Response of `POST /predict_chances`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmissionChance {
    pub admitted_chance_percent: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct WelcomeMessage {
    pub message: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_courses_response_error_shape() {
        let json = serde_json::to_value(CoursesResponse::Error {
            error: "no such table: courses".into(),
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"error": "no such table: courses"}));
    }

    #[test]
    fn test_courses_response_list_is_plain_array() {
        let json = serde_json::to_value(CoursesResponse::Courses(vec![CourseListing {
            course_id: 1,
            course_name: "B.Sc. Informatik".into(),
            language: Some("German".into()),
            description: None,
            university_name: "TUM".into(),
            city: Some("München".into()),
        }]))
        .unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["course_name"], "B.Sc. Informatik");
        assert_eq!(json[0]["description"], serde_json::Value::Null);
    }

    #[test]
    fn test_admission_chance_field_name() {
        let json = serde_json::to_value(AdmissionChance {
            admitted_chance_percent: 87,
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"admitted_chance_percent": 87}));
    }
}
