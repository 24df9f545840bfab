//! InvParse Web Server
//!
//! Axum-based REST API for invoice extraction and lookup.
//!
//! Security features:
//! - Optional API key authentication (constant-time comparison)
//! - Restrictive CORS policy
//! - Upload size limit on document extraction
//! - Sanitized error responses

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Request, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use invparse_core::{AnalyzerClient, Database, DocumentAnalyzer, InvoicePipeline};

mod handlers;

/// Maximum document upload size (10 MB)
pub const MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024;

/// Room for multipart boundaries and part headers on top of the file itself
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Client-facing message when the analysis service fails
pub const UNAVAILABLE_MESSAGE: &str = "The service is currently unavailable. Please try again later.";

/// Client-facing message when a document is rejected by the confidence gate
pub const INVALID_DOCUMENT_MESSAGE: &str =
    "Invalid document. Please upload a valid PDF invoice with high confidence.";

/// Server configuration
#[derive(Clone)]
pub struct ServerConfig {
    /// Whether an API key is required (secure by default)
    pub require_auth: bool,
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
    /// Accepted API keys, sent as "Bearer <key>" in the Authorization header
    pub api_keys: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            require_auth: true,
            allowed_origins: vec![],
            api_keys: vec![],
        }
    }
}

/// Shared application state
pub struct AppState {
    pub db: Database,
    pub pipeline: InvoicePipeline,
    pub config: ServerConfig,
}

/// Rejects requests to the invoice routes that lack a configured API key
async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    if !state.config.require_auth {
        return next.run(request).await;
    }

    let key = bearer_key(request.headers());
    let key_presented = key.is_some();
    let authorized = key.is_some_and(|key| validate_api_key(key, &state.config.api_keys));

    if authorized {
        return next.run(request).await;
    }

    warn!(
        path = %request.uri().path(),
        key_presented,
        "Rejected unauthenticated request"
    );
    AppError::new(StatusCode::UNAUTHORIZED, "Authentication required").into_response()
}

/// Key carried as `Authorization: Bearer <key>`
fn bearer_key(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Constant-time match of `provided` against every configured key
fn validate_api_key(provided: &str, valid_keys: &[String]) -> bool {
    use subtle::ConstantTimeEq;

    valid_keys.iter().any(|key| {
        // ct_eq is only constant-time for equal lengths
        key.len() == provided.len() && bool::from(key.as_bytes().ct_eq(provided.as_bytes()))
    })
}

/// Parse a comma-separated list of API keys (e.g. from INVPARSE_API_KEYS)
pub fn parse_api_keys(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(String::from)
        .collect()
}

/// Body of a successful delete
#[derive(Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// CORS for browser clients: same-origin unless origins are listed
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if allowed_origins.is_empty() {
        return cors;
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    cors.allow_origin(origins)
}

/// Build the router: invoice routes behind auth, `/health` open
pub fn create_router(db: Database, analyzer: AnalyzerClient, config: ServerConfig) -> Router {
    info!(
        backend = analyzer.backend_name(),
        host = %analyzer.host(),
        "Document analyzer configured"
    );

    let cors = cors_layer(&config.allowed_origins);
    let state = Arc::new(AppState {
        pipeline: InvoicePipeline::new(analyzer, db.clone()),
        db,
        config,
    });

    let invoice_routes = Router::new()
        .route(
            "/extract",
            post(handlers::extract_invoice)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_SIZE + MULTIPART_OVERHEAD)),
        )
        .route(
            "/invoice/:id",
            get(handlers::get_invoice).delete(handlers::delete_invoice),
        )
        .route("/invoices/vendor/:vendor", get(handlers::get_vendor_invoices))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .route("/health", get(handlers::health))
        .merge(invoice_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
}

/// Bind `host:port` and serve until the process is stopped
pub async fn serve_with_config(
    db: Database,
    analyzer: AnalyzerClient,
    host: &str,
    port: u16,
    config: ServerConfig,
) -> anyhow::Result<()> {
    if !config.require_auth {
        warn!("⚠️  Authentication disabled - do not expose to network!");
    } else if config.api_keys.is_empty() {
        warn!("⚠️  No API keys configured (set INVPARSE_API_KEYS); every invoice request will be rejected");
    }

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %addr, "Invoice server listening");

    axum::serve(listener, create_router(db, analyzer, config)).await?;
    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Error returned by handlers, rendered as `{"error": message}`
pub struct AppError {
    status: StatusCode,
    message: String,
    /// Cause, logged but never sent to the client
    source: Option<anyhow::Error>,
}

impl AppError {
    fn new(status: StatusCode, message: &str) -> Self {
        Self {
            status,
            message: message.to_string(),
            source: None,
        }
    }

    pub fn bad_request(msg: &str) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }

    pub fn not_found(msg: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, msg)
    }

    pub fn service_unavailable(msg: &str) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, msg)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Some(source) = &self.source {
            error!(status = %self.status, error = %source, "Request failed");
        }
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// Unexpected failures (storage, pool) become a generic 500
impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self {
            source: Some(err.into()),
            ..Self::new(StatusCode::INTERNAL_SERVER_ERROR, "An internal error occurred")
        }
    }
}
