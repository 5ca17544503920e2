use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::checker::check_domain;
use crate::client::BacklinkSource;
use crate::error::Error;
use crate::stats::DomainSummary;

const INDEX_HTML: &str = include_str!("../static/index.html");

/// Shared, read-only handler state. `source` is `None` when no API token was
/// configured; the app still serves the form and `/health`.
#[derive(Clone)]
pub struct AppState {
    source: Option<Arc<dyn BacklinkSource>>,
    default_limit: usize,
}

impl AppState {
    pub fn new(source: Option<Arc<dyn BacklinkSource>>, default_limit: usize) -> Self {
        Self {
            source,
            default_limit,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    #[serde(flatten)]
    pub summary: DomainSummary,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub api_configured: bool,
}

pub struct AppError(pub Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status_code = match &self.0 {
            Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Error::MissingToken => StatusCode::SERVICE_UNAVAILABLE,
            e if e.is_upstream() => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse {
            success: false,
            error: self.0.to_string(),
        });
        (status_code, body).into_response()
    }
}

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        AppError(err)
    }
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        api_configured: state.source.is_some(),
    })
}

async fn analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let source = state.source.as_deref().ok_or(Error::MissingToken)?;

    let domain = request.domain.trim();
    if domain.is_empty() {
        return Err(Error::InvalidInput("domain is required".into()).into());
    }

    let limit = request.limit.unwrap_or(state.default_limit);
    if limit == 0 {
        return Err(Error::InvalidInput("limit must be greater than 0".into()).into());
    }

    match check_domain(source, domain, limit).await {
        Ok(summary) => Ok(Json(AnalyzeResponse {
            success: true,
            summary,
        })),
        Err(e) => {
            warn!(action = "analyze", component = "web", domain = domain, error = %e, "Analysis failed");
            Err(e.into())
        }
    }
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/analyze", post(analyze))
        .route("/health", get(health))
        .with_state(state)
}

pub async fn serve(state: AppState, host: &str, port: u16) -> anyhow::Result<()> {
    let api_configured = state.source.is_some();
    if !api_configured {
        error!(action = "start", component = "web", "API token missing; /analyze will report the service as not configured");
    }

    let listener = TcpListener::bind((host, port)).await?;
    let addr = listener.local_addr()?;
    info!(action = "listen", component = "web", address = %addr, api_configured, "Web interface listening");
    println!("Backlink checker listening on http://{}", addr);

    axum::serve(listener, routes(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(action = "shutdown", component = "web", error = %e, "Could not listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!(action = "shutdown", component = "web", "Shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{BacklinkRecord, BacklinksPage};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    struct StaticSource(BacklinksPage);

    #[async_trait]
    impl BacklinkSource for StaticSource {
        async fn fetch(&self, _domain: &str, limit: usize) -> crate::Result<BacklinksPage> {
            let mut page = self.0.clone();
            page.backlinks.truncate(limit);
            Ok(page)
        }
    }

    struct DownSource;

    #[async_trait]
    impl BacklinkSource for DownSource {
        async fn fetch(&self, _domain: &str, _limit: usize) -> crate::Result<BacklinksPage> {
            Err(Error::Status {
                status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
                body: "maintenance".into(),
            })
        }
    }

    fn app_with(source: Option<Arc<dyn BacklinkSource>>) -> Router {
        routes(AppState::new(source, 1000))
    }

    fn sample_source() -> Arc<dyn BacklinkSource> {
        Arc::new(StaticSource(BacklinksPage {
            backlinks: vec![
                BacklinkRecord {
                    url_from: "https://a.com/post".into(),
                    image: true,
                    domain_inlink_rank: 50.0,
                    ..Default::default()
                },
                BacklinkRecord {
                    url_from: "https://b.org/".into(),
                    nofollow: true,
                    ..Default::default()
                },
            ],
            has_more: true,
        }))
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn post_analyze(body: Value) -> Request<Body> {
        Request::post("/analyze")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn health_reports_configuration() {
        let request = || Request::get("/health").body(Body::empty()).unwrap();

        let (status, body) = send(app_with(Some(sample_source())), request()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "ok", "api_configured": true}));

        let (_, body) = send(app_with(None), request()).await;
        assert_eq!(body["api_configured"], false);
    }

    #[tokio::test]
    async fn index_serves_form() {
        let response = app_with(None)
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("<form"));
        assert!(html.contains("/analyze"));
    }

    #[tokio::test]
    async fn analyze_returns_flattened_summary() {
        let (status, body) = send(
            app_with(Some(sample_source())),
            post_analyze(json!({"domain": "https://www.example.com"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["domain"], "example.com");
        assert_eq!(body["total_backlinks"], 2);
        assert_eq!(body["total_referring_domains"], 2);
        assert_eq!(body["dofollow_count"], 1);
        assert_eq!(body["nofollow_count"], 1);
        assert_eq!(body["image_links"], 1);
        assert_eq!(body["avg_domain_rank"], 50.0);
        assert_eq!(body["has_more"], true);
        assert_eq!(body["all_backlinks"][1]["position"], 2);
        assert_eq!(body["all_backlinks"][1]["is_nofollow"], true);
    }

    #[tokio::test]
    async fn analyze_honours_limit() {
        let (_, body) = send(
            app_with(Some(sample_source())),
            post_analyze(json!({"domain": "example.com", "limit": 1})),
        )
        .await;
        assert_eq!(body["total_backlinks"], 1);
    }

    #[tokio::test]
    async fn empty_domain_is_bad_request() {
        let (status, body) = send(
            app_with(Some(sample_source())),
            post_analyze(json!({"domain": "   "})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("domain"));

        let (status, _) = send(app_with(Some(sample_source())), post_analyze(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unconfigured_api_is_unavailable() {
        let (status, body) = send(app_with(None), post_analyze(json!({"domain": "example.com"}))).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn upstream_failure_is_bad_gateway() {
        let (status, body) = send(
            app_with(Some(Arc::new(DownSource))),
            post_analyze(json!({"domain": "example.com"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body["error"].as_str().unwrap().contains("maintenance"));
    }
}
