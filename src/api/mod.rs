//! Axum HTTP surface.

pub mod admission;
pub mod courses;

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};

use crate::state::AppState;

/// Credentialed CORS for a single front-end origin, any method or header.
pub fn cors_layer(frontend_origin: &str) -> Result<CorsLayer> {
    let origin: HeaderValue = frontend_origin
        .parse()
        .with_context(|| format!("Invalid front-end origin: {frontend_origin}"))?;

    // Wildcards are not allowed together with credentials, so methods and
    // headers mirror the preflight request instead.
    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request()))
}

pub fn router(state: AppState) -> Result<Router> {
    let cors = cors_layer(&state.config.frontend_origin)?;

    Ok(Router::new()
        .route("/", get(courses::root))
        .route("/courses", get(courses::list_courses))
        .route("/recommend_courses", get(courses::recommend_courses))
        .route("/predict_chances", post(admission::predict_chances))
        .layer(cors)
        .with_state(state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::embedding::Embedder;
    use crate::estimator::training;
    use crate::search::builder::build_course_index;
    use crate::store::seed;

    const FRONTEND: &str = "http://localhost:3000";

    /// Build every artifact in a temp dir and serve the router on a local port.
    async fn serve() -> (tempfile::TempDir, String) {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::with_data_dir(dir.path());
        seed::create_database(&config.db_path()).unwrap();
        let (model, _) = training::train(&config.training).unwrap();
        model.save(&config.model_path()).unwrap();
        let embedder = Embedder::new(&config.embedding).unwrap();
        build_course_index(&config, &embedder, false).await.unwrap();

        let app = router(AppState::load(config).unwrap()).unwrap();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (dir, format!("http://{addr}"))
    }

    async fn preflight(base: &str, origin: &str) -> reqwest::Response {
        reqwest::Client::new()
            .request(reqwest::Method::OPTIONS, format!("{base}/predict_chances"))
            .header("Origin", origin)
            .header("Access-Control-Request-Method", "POST")
            .header("Access-Control-Request-Headers", "content-type,x-requested-with")
            .send()
            .await
            .unwrap()
    }

    fn header<'a>(resp: &'a reqwest::Response, name: &str) -> Option<&'a str> {
        resp.headers().get(name).and_then(|v| v.to_str().ok())
    }

    #[test]
    fn test_cors_layer_accepts_configured_origin() {
        assert!(cors_layer(FRONTEND).is_ok());
    }

    #[test]
    fn test_cors_layer_rejects_unprintable_origin() {
        assert!(cors_layer("http://localhost:3000\n").is_err());
    }

    #[tokio::test]
    async fn test_preflight_from_frontend_allows_credentials() {
        let (_dir, base) = serve().await;
        let resp = preflight(&base, FRONTEND).await;

        assert!(resp.status().is_success());
        assert_eq!(header(&resp, "access-control-allow-origin"), Some(FRONTEND));
        assert_eq!(header(&resp, "access-control-allow-credentials"), Some("true"));
        assert!(header(&resp, "access-control-allow-methods")
            .unwrap_or_default()
            .contains("POST"));
        assert!(header(&resp, "access-control-allow-headers")
            .unwrap_or_default()
            .contains("x-requested-with"));
    }

    #[tokio::test]
    async fn test_other_origin_gets_no_allow_origin() {
        let (_dir, base) = serve().await;

        let resp = preflight(&base, "http://evil.example").await;
        assert_eq!(header(&resp, "access-control-allow-origin"), None);

        let resp = reqwest::Client::new()
            .get(format!("{base}/"))
            .header("Origin", "http://localhost:3001")
            .send()
            .await
            .unwrap();
        assert_eq!(header(&resp, "access-control-allow-origin"), None);
    }

    #[tokio::test]
    async fn test_simple_request_from_frontend() {
        let (_dir, base) = serve().await;

        let resp = reqwest::Client::new()
            .get(format!("{base}/"))
            .header("Origin", FRONTEND)
            .send()
            .await
            .unwrap();
        assert_eq!(header(&resp, "access-control-allow-origin"), Some(FRONTEND));
        assert_eq!(header(&resp, "access-control-allow-credentials"), Some("true"));
        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body["message"], "Welcome to the Uni-Navigator API!");
    }

    #[tokio::test]
    async fn test_predict_chances_over_http() {
        let (_dir, base) = serve().await;

        let resp = reqwest::Client::new()
            .post(format!("{base}/predict_chances"))
            .json(&serde_json::json!({"grade": 1.3, "language_level": "C1"}))
            .send()
            .await
            .unwrap();
        assert!(resp.status().is_success());
        let body: serde_json::Value = resp.json().await.unwrap();
        let percent = body["admitted_chance_percent"].as_u64().unwrap();
        assert!(percent <= 100);
    }
}
