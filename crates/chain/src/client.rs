//! Chain client trait and error type.

use async_trait::async_trait;
use drip_common::{Address, TxHash};
use thiserror::Error;

/// Errors surfaced by a chain client.
#[derive(Error, Debug)]
pub enum ChainError {
    /// The transport failed before the node answered.
    #[error("transport error: {0}")]
    Transport(String),

    /// The node answered with a JSON-RPC error. The message text is kept
    /// verbatim; callers classify failures by matching substrings in it.
    #[error("node error: {message}")]
    Node { message: String },

    /// The node answered with something we could not decode.
    #[error("invalid response: {0}")]
    Decode(String),

    /// No receipt appeared within the configured confirmation window.
    #[error("confirmation timed out for {0}")]
    ConfirmationTimeout(TxHash),
}

pub type ChainResult<T> = Result<T, ChainError>;

/// Read and submit operations against the network.
///
/// Implementations are injected into the claim service; tests substitute
/// a mock.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Account balance in wei.
    async fn balance(&self, address: &Address) -> ChainResult<u128>;

    /// Current network gas price in wei.
    async fn gas_price(&self) -> ChainResult<u128>;

    /// Transaction count for the account including pending transactions.
    async fn pending_transaction_count(&self, address: &Address) -> ChainResult<u64>;

    /// The network chain id.
    async fn chain_id(&self) -> ChainResult<u64>;

    /// Broadcast a signed raw transaction, returning its hash.
    async fn send_raw_transaction(&self, raw: &[u8]) -> ChainResult<TxHash>;

    /// Block until the transaction has at least one confirmation.
    async fn wait_for_confirmation(&self, hash: &TxHash) -> ChainResult<()>;
}
