//! HTTP transport: routes, body limits, error shaping.

use crate::app::App;
use crate::models::{AnalysisResponse, ErrorResponse, FortuneRequest};
use crate::{Error, Result};
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{header, Method, StatusCode},
    middleware,
    response::{IntoResponse, Json, Response},
    routing::{any, get},
    Router,
};
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

pub const FORTUNE_PATH: &str = "/api/ai";

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed ({}): {}", status, self);
        } else {
            warn!("Request rejected ({}): {}", status, self);
        }

        let body = ErrorResponse {
            error: self.public_message().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

async fn fortune_handler(State(app): State<Arc<App>>, method: Method, body: Bytes) -> Response {
    if method != Method::POST {
        return Error::MethodNotAllowed.into_response();
    }

    let request = FortuneRequest::from_body(&body);
    match app.tell(&request).await {
        Ok(analysis) => (
            [(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")],
            Json(AnalysisResponse { analysis }),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// The body limit rejects oversized requests before the handler runs, with a
/// plain-text body. Reshape those into the usual JSON error envelope.
async fn json_payload_too_large(response: Response) -> Response {
    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"));

    if response.status() == StatusCode::PAYLOAD_TOO_LARGE && !is_json {
        return Error::PayloadTooLarge.into_response();
    }
    response
}

async fn health_handler() -> &'static str {
    "ok"
}

/// Build the service router. Any method reaches the fortune handler so that
/// non-POST requests get the JSON 405 body rather than an empty one.
pub fn router(app: Arc<App>, max_body_bytes: usize) -> Router {
    Router::new()
        .route(FORTUNE_PATH, any(fortune_handler))
        .route("/healthz", get(health_handler))
        .with_state(app)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(middleware::map_response(json_payload_too_large))
        .layer(TraceLayer::new_for_http())
}

/// Serve files from `dir` for every path the API does not handle.
pub fn with_static_dir(router: Router, dir: &Path) -> Router {
    info!("Serving static files from {}", dir.display());
    router.fallback_service(ServeDir::new(dir))
}

pub async fn serve(listener: TcpListener, router: Router) -> Result<()> {
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
