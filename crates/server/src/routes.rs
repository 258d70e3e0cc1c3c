use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use circle_core::client::{analyze_url, AnalyzeRequest, API_BASE};
use serde::Serialize;

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route(&analyze_url(API_BASE), post(analyze))
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
pub struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Validate the body and forward it to the analysis backend. The upstream
/// status and body are passed through untouched.
async fn analyze(
    State(state): State<AppState>,
    body: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = body.map_err(|e| {
        error_with_details(StatusCode::BAD_REQUEST, "Invalid request body", e.body_text())
    })?;
    request
        .validate()
        .map_err(|d| error_with_details(StatusCode::BAD_REQUEST, "Invalid request body", d))?;

    let base = state.config.backend_url.as_deref().ok_or_else(|| {
        error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "Analysis backend not configured",
        )
    })?;
    let url = analyze_url(base);

    tracing::debug!(
        lat = request.lat,
        lng = request.lng,
        walk_speed = request.walk_speed,
        "forwarding analysis request"
    );
    let upstream = state
        .http
        .post(&url)
        .json(&request)
        .send()
        .await
        .map_err(|e| {
            tracing::warn!("Analysis backend {url} failed: {e}");
            if e.is_timeout() {
                error_response(StatusCode::GATEWAY_TIMEOUT, "Analysis backend timed out")
            } else {
                error_response(StatusCode::BAD_GATEWAY, "Analysis backend unreachable")
            }
        })?;

    let status = StatusCode::from_u16(upstream.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    let content_type = upstream
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/json")
        .to_string();
    let bytes = upstream.bytes().await.map_err(|e| {
        tracing::warn!("Reading analysis response failed: {e}");
        error_response(StatusCode::BAD_GATEWAY, "Analysis backend response incomplete")
    })?;

    if !status.is_success() {
        tracing::warn!("Analysis backend returned {status}");
    }
    Ok((status, [(header::CONTENT_TYPE, content_type)], bytes).into_response())
}

fn error_response(status: StatusCode, msg: &str) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: msg.to_string(),
            details: None,
        }),
    )
}

fn error_with_details(status: StatusCode, msg: &str, details: String) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: msg.to_string(),
            details: Some(details),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{app, config::Config};
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::{json, Value};
    use std::path::PathBuf;
    use std::time::Duration;
    use tower::ServiceExt;

    fn state(backend_url: Option<String>, viewer_dir: PathBuf) -> AppState {
        AppState::new(Config {
            bind_addr: "127.0.0.1:0".to_string(),
            backend_url,
            viewer_dir,
            upstream_timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    fn analyze_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/v1/analyze")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(resp: Response) -> Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    /// Fake backend on an ephemeral port that echoes the request body.
    async fn spawn_upstream(status: StatusCode) -> String {
        let upstream = Router::new().route(
            "/analyze",
            post(move |Json(body): Json<Value>| async move {
                (
                    status,
                    Json(json!({"total_score": 88.0, "grade": "B", "echo": body})),
                )
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, upstream).await.unwrap();
        });
        format!("http://{addr}")
    }

    const BODY: &str = r#"{"lng": 120.1551, "lat": 30.2741, "time_threshold": 15, "walk_speed": 5}"#;

    #[tokio::test]
    async fn test_health() {
        let resp = app(state(None, PathBuf::from("missing")))
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_malformed_body_is_rejected() {
        let app = app(state(Some("http://127.0.0.1:9".into()), PathBuf::from("missing")));
        let resp = app.clone().oneshot(analyze_request("not json")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await["error"], "Invalid request body");

        let resp = app
            .oneshot(analyze_request(r#"{"lng": 120.0, "lat": 95.0}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(resp).await["details"]
            .as_str()
            .unwrap()
            .contains("latitude"));
    }

    #[tokio::test]
    async fn test_no_backend_configured() {
        let resp = app(state(None, PathBuf::from("missing")))
            .oneshot(analyze_request(BODY))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_unreachable_backend() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let resp = app(state(Some(format!("http://{addr}")), PathBuf::from("missing")))
            .oneshot(analyze_request(BODY))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_forwards_to_backend() {
        let base = spawn_upstream(StatusCode::OK).await;
        let resp = app(state(Some(base), PathBuf::from("missing")))
            .oneshot(analyze_request(r#"{"lng": 120.1551, "lat": 30.2741}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["total_score"], 88.0);
        assert_eq!(
            body["echo"],
            json!({"lng": 120.1551, "lat": 30.2741, "time_threshold": 15, "walk_speed": 5})
        );
    }

    #[tokio::test]
    async fn test_slow_backend_times_out() {
        let upstream = Router::new().route(
            "/analyze",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(3)).await;
                Json(json!({"total_score": 1.0}))
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, upstream).await.unwrap();
        });

        let state = AppState::new(Config {
            bind_addr: "127.0.0.1:0".to_string(),
            backend_url: Some(format!("http://{addr}")),
            viewer_dir: PathBuf::from("missing"),
            upstream_timeout: Duration::from_secs(1),
        })
        .unwrap();
        let resp = app(state).oneshot(analyze_request(BODY)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(body_json(resp).await["error"], "Analysis backend timed out");
    }

    #[tokio::test]
    async fn test_upstream_error_status_passes_through() {
        let base = spawn_upstream(StatusCode::INTERNAL_SERVER_ERROR).await;
        let resp = app(state(Some(base), PathBuf::from("missing")))
            .oneshot(analyze_request(BODY))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_unknown_paths_serve_index() {
        let dir = std::env::temp_dir().join(format!("circle-viewer-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("index.html"), "<div id=\"map\"></div>").unwrap();

        let resp = app(state(None, dir.clone()))
            .oneshot(Request::get("/some/deep/link").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"<div id=\"map\"></div>");

        let _ = std::fs::remove_dir_all(dir);
    }
}
