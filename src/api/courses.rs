use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;

use crate::models::{CourseMetadata, CoursesResponse, RecommendQuery, WelcomeMessage};
use crate::search::recommend::{recommend, RECOMMENDATION_COUNT};
use crate::state::AppState;
use crate::store::catalog;

/// GET / - Welcome message
pub async fn root() -> Json<WelcomeMessage> {
    Json(WelcomeMessage {
        message: "Welcome to the Uni-Navigator API!",
    })
}

/// GET /courses - Every course with its university's name and city.
///
/// Storage failures come back as `{"error": ...}` with a 200 status so the
/// front end can render them inline.
pub async fn list_courses(State(state): State<AppState>) -> Json<CoursesResponse> {
    let db_path = state.db_path.clone();
    let result = tokio::task::spawn_blocking(move || catalog::list_courses(&db_path)).await;

    let response = match result {
        Ok(Ok(courses)) => CoursesResponse::Courses(courses),
        Ok(Err(e)) => {
            tracing::error!("Course listing failed: {e:#}");
            CoursesResponse::Error {
                error: format!("{e:#}"),
            }
        }
        Err(e) => {
            tracing::error!("Course listing task failed: {e}");
            CoursesResponse::Error {
                error: e.to_string(),
            }
        }
    };
    Json(response)
}

/// GET /recommend_courses?query= - The three courses closest to the query text.
pub async fn recommend_courses(
    State(state): State<AppState>,
    Query(params): Query<RecommendQuery>,
) -> Result<Json<Vec<CourseMetadata>>, (StatusCode, String)> {
    tracing::info!("Received recommendation query: {:?}", params.query);

    recommend(
        &state.embedder,
        &state.index,
        &params.query,
        RECOMMENDATION_COUNT,
    )
    .await
    .map(Json)
    .map_err(|e| {
        tracing::warn!("Recommendation failed: {e:#}");
        (StatusCode::BAD_GATEWAY, format!("Recommendation failed: {e:#}"))
    })
}
