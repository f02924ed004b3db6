//! HTTP API for the faucet service.

use crate::error::FaucetResult;
use crate::service::{ClaimRequest, ClaimService, FaucetStatus};
use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use drip_common::TxHash;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

/// Body of a successful claim.
#[derive(Debug, Serialize)]
pub struct ClaimResponse {
    pub success: bool,
    #[serde(rename = "txHash")]
    pub tx_hash: TxHash,
}

/// `POST /api/claim`
pub async fn claim_handler(
    State(service): State<Arc<ClaimService>>,
    Json(request): Json<ClaimRequest>,
) -> Response {
    info!(
        "Claim request: address={}, amount={}",
        request.address, request.amount
    );

    match service.claim(&request).await {
        Ok(receipt) => Json(ClaimResponse {
            success: true,
            tx_hash: receipt.tx_hash,
        })
        .into_response(),
        Err(e) => {
            error!("Claim failed for {}: {}", request.address, e);
            e.into_response()
        }
    }
}

/// `GET /api/status`
pub async fn status_handler(
    State(service): State<Arc<ClaimService>>,
) -> FaucetResult<Json<FaucetStatus>> {
    Ok(Json(service.status().await?))
}

/// `GET /health`
pub async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// `GET /metrics`
pub async fn metrics_handler(State(service): State<Arc<ClaimService>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        service.metrics().encode(),
    )
}

/// Route table; layers (CORS, tracing) are added by the binary.
pub fn router(service: Arc<ClaimService>) -> Router {
    Router::new()
        .route("/api/claim", post(claim_handler))
        .route("/api/status", get(status_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(service)
}
