//! Blockchain access for the drip faucet.
//!
//! Everything the claim path needs from the network lives behind the
//! [`ChainClient`] trait: balance, gas price and pending-count queries,
//! raw transaction broadcast and the confirmation wait. The production
//! implementation is [`HttpRpcClient`], a JSON-RPC 2.0 transport.

pub mod client;
pub mod nonce;
pub mod rpc;
pub mod tx;
pub mod wallet;

pub use client::{ChainClient, ChainError, ChainResult};
pub use nonce::NonceManager;
pub use rpc::HttpRpcClient;
pub use tx::TransferTx;
pub use wallet::Wallet;
