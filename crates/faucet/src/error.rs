//! Error types for the faucet service.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use drip_chain::{client::ChainError, wallet::WalletError};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Faucet service errors.
///
/// Chain failures are classified after the fact by matching substrings in
/// the node's error text (see `From<ChainError>`); anything unmatched is
/// `Unexpected` and surfaces without detail.
#[derive(Error, Debug)]
pub enum FaucetError {
    #[error("invalid destination address")]
    InvalidAddress,

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("cooldown active: {minutes} minutes remaining")]
    CooldownActive { minutes: u64 },

    #[error("transfer already broadcast")]
    DuplicateSubmission,

    #[error("replacement fee conflict on the network")]
    NetworkCongested,

    #[error("faucet balance below the configured minimum")]
    InsufficientFunds,

    #[error("store error: {0}")]
    Store(#[from] sled::Error),

    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl From<ChainError> for FaucetError {
    fn from(err: ChainError) -> Self {
        let message = err.to_string();
        if message.contains("already known") {
            FaucetError::DuplicateSubmission
        } else if message.contains("replacement fee too low")
            || message.contains("replacement transaction underpriced")
        {
            FaucetError::NetworkCongested
        } else {
            FaucetError::Unexpected(message)
        }
    }
}

impl From<WalletError> for FaucetError {
    fn from(err: WalletError) -> Self {
        FaucetError::Unexpected(err.to_string())
    }
}

impl IntoResponse for FaucetError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            FaucetError::InvalidAddress => {
                (StatusCode::BAD_REQUEST, "Invalid Ethereum address".to_string())
            }
            FaucetError::InvalidAmount(_) => (StatusCode::BAD_REQUEST, "Invalid amount".to_string()),
            FaucetError::CooldownActive { minutes } => (
                StatusCode::TOO_MANY_REQUESTS,
                format!("Please wait {} minutes before claiming again", minutes),
            ),
            FaucetError::DuplicateSubmission => (
                StatusCode::CONFLICT,
                "Transaction already submitted. Please wait and try again later.".to_string(),
            ),
            FaucetError::NetworkCongested => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Network is busy. Please try again later.".to_string(),
            ),
            FaucetError::InsufficientFunds => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Faucet is out of funds. Please try again later.".to_string(),
            ),
            FaucetError::Store(err) => {
                error!("Cooldown store failure: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred".to_string(),
                )
            }
            FaucetError::Unexpected(detail) => {
                error!("Unexpected claim failure: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub type FaucetResult<T> = Result<T, FaucetError>;
