use axum::extract::State;
use axum::Json;

use crate::models::{AdmissionChance, AdmissionQuery};
use crate::state::AppState;

/// POST /predict_chances - Admission chance in percent for a grade and
/// language level. Unknown levels count as B2; grades are not range-checked.
pub async fn predict_chances(
    State(state): State<AppState>,
    Json(query): Json<AdmissionQuery>,
) -> Json<AdmissionChance> {
    tracing::info!(
        "Received prediction query: grade={} language_level={:?}",
        query.grade,
        query.language_level
    );

    let admitted_chance_percent = state
        .estimator
        .predict_chance_percent(query.grade, &query.language_level);

    Json(AdmissionChance {
        admitted_chance_percent,
    })
}
