//! Testnet faucet service.
//!
//! Accepts claim requests over HTTP, enforces a per-address cooldown
//! against a key-value store, and dispenses test currency through an
//! on-chain value transfer:
//! - Strict address validation before any external call
//! - Cooldown tracking with per-key expiry (in-memory or sled-backed)
//! - Serialized nonce issuance for concurrent claims
//! - Monitoring and metrics

pub mod api;
pub mod config;
pub mod error;
pub mod metrics;
pub mod service;
pub mod store;

pub use config::FaucetConfig;
pub use error::{FaucetError, FaucetResult};
pub use metrics::FaucetMetrics;
pub use service::{ClaimReceipt, ClaimRequest, ClaimService, FaucetStatus};
pub use store::{CooldownStore, MemoryCooldownStore, SledCooldownStore};
