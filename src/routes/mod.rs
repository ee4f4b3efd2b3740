//! Router assembly: HTTP endpoints, static files, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;

/// Build the application router with:
/// - the generation proxy at `/api/generate-test`
/// - form layout, theme and health under `/api/v1/...`
/// - CORS (allow any origin/method/headers)
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
/// - the frontend bundle from `static_dir` with index fallback, when configured
pub fn build_router(state: Arc<AppState>) -> Router {
    let static_dir = state.config.static_dir.clone();

    let router = Router::new()
        .route("/api/generate-test", post(http::http_post_generate_test))
        .route("/api/v1/health", get(http::http_health))
        .route("/api/v1/form", get(http::http_get_form))
        .route("/api/v1/theme", get(http::http_get_theme).put(http::http_put_theme))
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        );

    match static_dir {
        Some(dir) => {
            let index = std::path::Path::new(&dir).join("index.html");
            let static_service = ServeDir::new(&dir)
                .append_index_html_on_directories(true)
                .not_found_service(ServeFile::new(index));
            router.fallback_service(static_service)
        }
        None => router,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header::CONTENT_TYPE, Method, Request, StatusCode},
        Json,
    };
    use serde_json::{json, Value};
    use tower::util::ServiceExt; // For oneshot method

    use crate::upstream::tests::{closed_port_url, spawn_mock};

    async fn call(app: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(v) => {
                req = req.header(CONTENT_TYPE, "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        let response = app.oneshot(req.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    fn app(base: &str) -> Router {
        build_router(Arc::new(AppState::for_tests(base)))
    }

    fn full_body() -> Value {
        json!({ "content": "Вода кипит при 100 градусах.", "questionCount": 5, "difficulty": "easy", "fileFormat": "pdf" })
    }

    #[tokio::test]
    async fn generate_test_wraps_upstream_text() {
        let upstream = Router::new().route(
            "/api/generate",
            post(|Json(v): Json<Value>| async move {
                assert_eq!(v["text"], "Вода кипит при 100 градусах.");
                assert_eq!(v["questionCount"], 5);
                assert_eq!(v["difficulty"], "easy");
                assert!(v.get("format").is_none());
                Json(json!({ "success": true, "generatedTest": "X" }))
            }),
        );
        let base = spawn_mock(upstream).await;

        let (status, body) = call(app(&base), Method::POST, "/api/generate-test", Some(full_body())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "questions": [{ "question": "Сгенерированный тест", "content": "X" }],
                "format": "pdf",
                "success": true
            })
        );
    }

    #[tokio::test]
    async fn missing_parameters_are_400() {
        let base = closed_port_url().await;
        for key in ["content", "questionCount", "difficulty", "fileFormat"] {
            let mut v = full_body();
            v.as_object_mut().unwrap().remove(key);
            let (status, body) = call(app(&base), Method::POST, "/api/generate-test", Some(v)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{key}");
            assert!(!body["error"].as_str().unwrap_or_default().is_empty(), "{key}");
        }
    }

    #[tokio::test]
    async fn malformed_json_is_400_with_error_field() {
        let req = Request::builder()
            .method(Method::POST)
            .uri("/api/generate-test")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app(&closed_port_url().await).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let v: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(v["error"].as_str().unwrap().starts_with("Некорректные параметры"));
    }

    #[tokio::test]
    async fn json_without_content_type_is_accepted() {
        let upstream = Router::new().route(
            "/api/generate",
            post(|| async { Json(json!({ "success": true, "generatedTest": "X" })) }),
        );
        let base = spawn_mock(upstream).await;
        let req = Request::builder()
            .method(Method::POST)
            .uri("/api/generate-test")
            .body(Body::from(full_body().to_string()))
            .unwrap();
        let response = app(&base).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let v: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(v["questions"][0]["content"], "X");
    }

    #[tokio::test]
    async fn unvalidated_values_are_forwarded_and_format_echoed() {
        let upstream = Router::new().route(
            "/api/generate",
            post(|Json(v): Json<Value>| async move {
                assert_eq!(v, json!({ "text": "t", "questionCount": 25, "difficulty": "легкий" }));
                Json(json!({ "success": true, "generatedTest": "ok" }))
            }),
        );
        let base = spawn_mock(upstream).await;
        let body = json!({ "content": "t", "questionCount": 25, "difficulty": "легкий", "fileFormat": "docx" });
        let (status, body) = call(app(&base), Method::POST, "/api/generate-test", Some(body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["format"], "docx");
        assert_eq!(body["questions"][0]["content"], "ok");
    }

    #[tokio::test]
    async fn upstream_error_status_is_500_with_code() {
        let upstream = Router::new().route("/api/generate", post(|| async { StatusCode::SERVICE_UNAVAILABLE }));
        let base = spawn_mock(upstream).await;
        let (status, body) = call(app(&base), Method::POST, "/api/generate-test", Some(full_body())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let error = body["error"].as_str().unwrap();
        assert!(error.contains("503"), "{error}");
        assert!(error.starts_with("Ошибка генерации: "), "{error}");
    }

    #[tokio::test]
    async fn unreachable_upstream_is_500() {
        let (status, body) =
            call(app(&closed_port_url().await), Method::POST, "/api/generate-test", Some(full_body())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().starts_with("Ошибка генерации: "));
    }

    #[tokio::test]
    async fn empty_generated_test_gives_empty_list_and_propagates_flag() {
        let upstream = Router::new().route("/api/generate", post(|| async { Json(json!({ "success": false })) }));
        let base = spawn_mock(upstream).await;
        let (status, body) = call(app(&base), Method::POST, "/api/generate-test", Some(full_body())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "questions": [], "format": "pdf", "success": false }));
    }

    #[tokio::test]
    async fn form_layout_exposes_defaults() {
        let (status, body) = call(app(&closed_port_url().await), Method::GET, "/api/v1/form", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["question_count"], json!({ "min": 1, "max": 20, "value": 7 }));
        assert_eq!(body["difficulty"]["slider"], json!({ "min": 0, "max": 2, "step": 1, "value": [0] }));
        assert_eq!(body["difficulty"]["selected_label"], "Легкий");
        assert_eq!(body["format"][0], json!({ "key": "txt", "label": "txt", "selected": true }));
    }

    #[tokio::test]
    async fn theme_round_trip() {
        let router = app(&closed_port_url().await);
        let (status, body) = call(router.clone(), Method::GET, "/api/v1/theme", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["theme"], "system");

        let (status, body) = call(router.clone(), Method::PUT, "/api/v1/theme", Some(json!({ "theme": "dark" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["theme"], "dark");

        let (_, body) = call(router.clone(), Method::GET, "/api/v1/theme", None).await;
        assert_eq!(body["theme"], "dark");

        let (status, body) = call(router, Method::PUT, "/api/v1/theme", Some(json!({ "theme": "sepia" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Неизвестная тема: sepia");
    }

    #[tokio::test]
    async fn malformed_theme_body_is_400_with_error_field() {
        let req = Request::builder()
            .method(Method::PUT)
            .uri("/api/v1/theme")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"colour":"dark"}"#))
            .unwrap();
        let response = app(&closed_port_url().await).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let v: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(v["error"].as_str().unwrap().starts_with("Некорректные параметры"));
    }

    #[tokio::test]
    async fn health() {
        let (status, body) = call(app(&closed_port_url().await), Method::GET, "/api/v1/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "ok": true }));
    }
}
