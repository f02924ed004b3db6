//! Claim processing.

use crate::config::FaucetConfig;
use crate::error::{FaucetError, FaucetResult};
use crate::metrics::FaucetMetrics;
use crate::store::CooldownStore;
use chrono::Utc;
use drip_chain::{ChainClient, NonceManager, TransferTx, Wallet};
use drip_common::{amount, Address, TxHash};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A single claim, as received over HTTP. The raw address string is kept
/// alongside the parsed form: the cooldown store is keyed by the address
/// exactly as supplied, case and all.
#[derive(Debug, Clone, Deserialize)]
pub struct ClaimRequest {
    pub address: String,
    pub amount: String,
}

/// The successful outcome of a claim.
#[derive(Debug, Clone, Serialize)]
pub struct ClaimReceipt {
    pub tx_hash: TxHash,
}

/// Faucet status summary.
#[derive(Debug, Clone, Serialize)]
pub struct FaucetStatus {
    pub address: Address,
    pub balance_wei: String,
    pub balance_ether: String,
    pub cooldown_secs: u64,
    pub max_claim_ether: String,
}

/// The claim pipeline: validate, check cooldown, dispense, record.
///
/// The chain client and cooldown store are injected; the only shared
/// mutable state is the nonce counter inside [`NonceManager`].
pub struct ClaimService {
    config: FaucetConfig,
    chain: Arc<dyn ChainClient>,
    store: Arc<dyn CooldownStore>,
    wallet: Wallet,
    nonces: NonceManager,
    metrics: FaucetMetrics,
    max_claim_wei: u128,
    min_balance_wei: u128,
}

impl ClaimService {
    pub fn new(
        config: FaucetConfig,
        chain: Arc<dyn ChainClient>,
        store: Arc<dyn CooldownStore>,
    ) -> anyhow::Result<Self> {
        let wallet = Wallet::from_hex(&config.private_key)?;
        let max_claim_wei = config.max_claim_wei()?;
        let min_balance_wei = config.min_balance_wei()?;
        let metrics = FaucetMetrics::new()?;

        info!("Faucet address: {}", wallet.address());

        Ok(Self {
            config,
            chain,
            store,
            wallet,
            nonces: NonceManager::new(),
            metrics,
            max_claim_wei,
            min_balance_wei,
        })
    }

    /// Process one claim end to end.
    pub async fn claim(&self, request: &ClaimRequest) -> FaucetResult<ClaimReceipt> {
        match self.process_claim(request).await {
            Ok((receipt, value)) => {
                self.metrics.claims_total.inc();
                self.metrics.wei_dispensed_total.inc_by(value as f64);
                info!(
                    "Dispensed {} ETH to {}, tx: {}",
                    amount::format_ether(value),
                    request.address,
                    receipt.tx_hash
                );
                Ok(receipt)
            }
            Err(err) => {
                self.metrics.claims_rejected_total.inc();
                Err(err)
            }
        }
    }

    async fn process_claim(&self, request: &ClaimRequest) -> FaucetResult<(ClaimReceipt, u128)> {
        // 1. Validate the request before touching the store or network.
        let destination: Address = request
            .address
            .parse()
            .map_err(|_| FaucetError::InvalidAddress)?;
        let value = self.validate_amount(&request.amount)?;

        // 2. Refuse to drain the faucet below its floor.
        self.check_faucet_balance().await?;

        // 3. Cooldown check, keyed by the address string as supplied.
        let now = Utc::now().timestamp();
        self.check_cooldown(&request.address, now).await?;

        // 4. Nonce for the sending account; serialized process-wide.
        let nonce = self
            .nonces
            .acquire(self.chain.as_ref(), &self.wallet.address())
            .await?;

        // 5. Build and sign the transfer at the current network gas price.
        let gas_price = self.chain.gas_price().await?;
        let chain_id = self.chain.chain_id().await?;
        let tx = TransferTx {
            nonce,
            gas_price,
            gas_limit: self.config.gas_limit,
            to: destination,
            value,
            chain_id,
        };
        let raw = self.wallet.sign_transfer(&tx)?;

        // 6. Broadcast and wait for one confirmation.
        let tx_hash = self.chain.send_raw_transaction(&raw).await?;
        debug!("Broadcast claim tx {} (nonce {})", tx_hash, nonce);
        self.chain.wait_for_confirmation(&tx_hash).await?;

        // 7. Only a confirmed transfer starts the cooldown window.
        self.store.record_claim(&request.address, now).await?;

        Ok((ClaimReceipt { tx_hash }, value))
    }

    fn validate_amount(&self, raw: &str) -> FaucetResult<u128> {
        let value =
            amount::parse_ether(raw).map_err(|e| FaucetError::InvalidAmount(e.to_string()))?;
        if value > self.max_claim_wei {
            return Err(FaucetError::InvalidAmount(format!(
                "exceeds per-claim maximum of {} wei",
                self.max_claim_wei
            )));
        }
        Ok(value)
    }

    async fn check_faucet_balance(&self) -> FaucetResult<()> {
        if self.min_balance_wei == 0 {
            return Ok(());
        }

        let balance = self.chain.balance(&self.wallet.address()).await?;
        if balance < self.min_balance_wei {
            warn!("Faucet balance low: {} wei", balance);
            return Err(FaucetError::InsufficientFunds);
        }
        Ok(())
    }

    async fn check_cooldown(&self, address: &str, now: i64) -> FaucetResult<()> {
        if let Some(last_claim) = self.store.last_claim(address).await? {
            let elapsed = now - last_claim;
            let cooldown = self.config.cooldown_secs as i64;

            if elapsed < cooldown {
                let remaining = cooldown - elapsed;
                let minutes = ((remaining + 59) / 60) as u64;
                warn!(
                    "Address {} claimed {}s ago, {}s remaining",
                    address, elapsed, remaining
                );
                return Err(FaucetError::CooldownActive { minutes });
            }
        }
        Ok(())
    }

    /// Current faucet account state for the status endpoint.
    pub async fn status(&self) -> FaucetResult<FaucetStatus> {
        let balance = self.chain.balance(&self.wallet.address()).await?;
        Ok(FaucetStatus {
            address: self.wallet.address(),
            balance_wei: balance.to_string(),
            balance_ether: amount::format_ether(balance),
            cooldown_secs: self.config.cooldown_secs,
            max_claim_ether: self.config.max_claim_ether(),
        })
    }

    pub fn metrics(&self) -> &FaucetMetrics {
        &self.metrics
    }
}
