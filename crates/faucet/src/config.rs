//! Faucet configuration.

use anyhow::{bail, Context};
use drip_common::amount;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

/// Faucet service configuration.
///
/// Values come from the environment (`FAUCET_*` variables) with CLI
/// overrides applied by the binary. `validate` runs once at startup;
/// nothing downstream re-checks these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaucetConfig {
    /// Server bind address
    pub server_addr: String,

    /// RPC endpoint for the blockchain node
    pub rpc_url: String,

    /// Faucet account private key (hex, 0x-prefixed or bare)
    pub private_key: String,

    /// Cooldown period between claims for the same address (seconds)
    pub cooldown_secs: u64,

    /// Gas limit for a plain value transfer
    pub gas_limit: u64,

    /// Maximum amount dispensed per claim (in wei)
    pub max_claim_amount: String,

    /// Minimum faucet balance required to serve claims (in wei, "0" disables)
    pub min_balance: String,

    /// Interval between receipt polls while waiting for confirmation (ms)
    pub receipt_poll_interval_ms: u64,

    /// Give up waiting for a confirmation after this long (seconds)
    pub confirmation_timeout_secs: u64,

    /// Enable CORS
    pub cors_enabled: bool,

    /// Cooldown store path; unset means in-memory only
    pub db_path: Option<String>,
}

impl Default for FaucetConfig {
    fn default() -> Self {
        Self {
            server_addr: "0.0.0.0:3000".to_string(),
            rpc_url: "http://localhost:8545".to_string(),
            private_key: String::new(),
            cooldown_secs: 180,
            gas_limit: 21000,
            max_claim_amount: "1000000000000000000".to_string(), // 1 ETH
            min_balance: "0".to_string(),
            receipt_poll_interval_ms: 2000,
            confirmation_timeout_secs: 120,
            cors_enabled: true,
            db_path: None,
        }
    }
}

impl FaucetConfig {
    /// Load from environment variables with defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("FAUCET_SERVER_ADDR") {
            config.server_addr = addr;
        }

        if let Ok(rpc_url) = std::env::var("FAUCET_RPC_URL") {
            config.rpc_url = rpc_url;
        }

        if let Ok(key) = std::env::var("FAUCET_PRIVATE_KEY") {
            config.private_key = key;
        }

        if let Ok(cooldown) = std::env::var("FAUCET_COOLDOWN_SECS") {
            config.cooldown_secs = cooldown.parse().unwrap_or(config.cooldown_secs);
        }

        if let Ok(gas_limit) = std::env::var("FAUCET_GAS_LIMIT") {
            config.gas_limit = gas_limit.parse().unwrap_or(config.gas_limit);
        }

        if let Ok(max_amount) = std::env::var("FAUCET_MAX_CLAIM_AMOUNT") {
            config.max_claim_amount = max_amount;
        }

        if let Ok(min_balance) = std::env::var("FAUCET_MIN_BALANCE") {
            config.min_balance = min_balance;
        }

        if let Ok(interval) = std::env::var("FAUCET_RECEIPT_POLL_INTERVAL_MS") {
            config.receipt_poll_interval_ms =
                interval.parse().unwrap_or(config.receipt_poll_interval_ms);
        }

        if let Ok(timeout) = std::env::var("FAUCET_CONFIRMATION_TIMEOUT_SECS") {
            config.confirmation_timeout_secs =
                timeout.parse().unwrap_or(config.confirmation_timeout_secs);
        }

        if let Ok(enabled) = std::env::var("FAUCET_CORS_ENABLED") {
            config.cors_enabled = enabled.to_lowercase() == "true";
        }

        if let Ok(db_path) = std::env::var("FAUCET_DB_PATH") {
            config.db_path = Some(db_path);
        }

        config
    }

    /// Startup validation; the service assumes a validated config.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.server_addr
            .parse::<SocketAddr>()
            .with_context(|| format!("invalid server address: {}", self.server_addr))?;

        if self.private_key.is_empty() {
            bail!("FAUCET_PRIVATE_KEY is required");
        }
        if self.cooldown_secs == 0 {
            bail!("cooldown must be nonzero");
        }
        if self.gas_limit < 21000 {
            bail!("gas limit {} below the cost of a value transfer", self.gas_limit);
        }

        self.max_claim_wei()
            .with_context(|| format!("invalid max claim amount: {}", self.max_claim_amount))?;
        self.min_balance_wei()
            .with_context(|| format!("invalid minimum balance: {}", self.min_balance))?;

        Ok(())
    }

    /// Per-claim cap in wei.
    pub fn max_claim_wei(&self) -> anyhow::Result<u128> {
        Ok(self.max_claim_amount.parse::<u128>()?)
    }

    /// Balance floor in wei (0 disables the check).
    pub fn min_balance_wei(&self) -> anyhow::Result<u128> {
        Ok(self.min_balance.parse::<u128>()?)
    }

    /// Human-readable per-claim cap for the status endpoint.
    pub fn max_claim_ether(&self) -> String {
        self.max_claim_wei()
            .map(amount::format_ether)
            .unwrap_or_default()
    }

    pub fn cooldown_duration(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }

    pub fn receipt_poll_interval(&self) -> Duration {
        Duration::from_millis(self.receipt_poll_interval_ms)
    }

    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_secs(self.confirmation_timeout_secs)
    }
}
