//! Test utilities for invparse-core
//!
//! This module provides testing infrastructure including a mock document
//! analysis server that can be used for development and integration tests.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde_json::Value;
use tokio::sync::oneshot;

use crate::analysis::{sample_invoice, RawAnalysisResult};

#[derive(Clone)]
struct MockState {
    result: Arc<RawAnalysisResult>,
    requests: Arc<AtomicUsize>,
}

/// Mock document analysis server for testing and development
pub struct MockAnalysisServer {
    addr: SocketAddr,
    requests: Arc<AtomicUsize>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockAnalysisServer {
    /// Start the mock server on an available port, answering with a sample invoice
    pub async fn start() -> Self {
        Self::start_with(sample_invoice()).await
    }

    /// Start the mock server answering every valid request with `result`
    pub async fn start_with(result: RawAnalysisResult) -> Self {
        let requests = Arc::new(AtomicUsize::new(0));
        let state = MockState {
            result: Arc::new(result),
            requests: requests.clone(),
        };

        let app = Router::new()
            .route("/actions/analyzeDocument", post(handle_analyze))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            requests,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Number of analyze requests received
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockAnalysisServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Analyze-document action
///
/// Rejects requests that do not carry inline document data, like the real
/// service does for an empty upload.
async fn handle_analyze(
    State(state): State<MockState>,
    Json(request): Json<Value>,
) -> Result<Json<RawAnalysisResult>, StatusCode> {
    state.requests.fetch_add(1, Ordering::SeqCst);

    let data = request
        .pointer("/document/data")
        .and_then(Value::as_str)
        .unwrap_or_default();
    if data.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let has_extraction = request
        .get("features")
        .and_then(Value::as_array)
        .map(|features| {
            features
                .iter()
                .any(|f| f["featureType"] == "KEY_VALUE_EXTRACTION")
        })
        .unwrap_or(false);
    if !has_extraction {
        return Err(StatusCode::BAD_REQUEST);
    }

    Ok(Json((*state.result).clone()))
}
