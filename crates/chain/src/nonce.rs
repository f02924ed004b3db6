//! Process-wide nonce tracking for the sending account.

use crate::client::{ChainClient, ChainResult};
use drip_common::Address;
use tokio::sync::Mutex;
use tracing::debug;

/// Sentinel for "no nonce issued yet by this process".
const UNISSUED: i64 = -1;

/// Tracks the last nonce issued by this process for the faucet account.
///
/// The network's pending transaction count alone is not enough: it lags
/// behind when several claims are in flight from this process at once.
/// Each acquisition takes the greater of (pending count - 1) and the last
/// issued value, then issues the successor. The counter lock is held
/// across the pending-count query so concurrent claims serialize and can
/// never be handed the same nonce.
pub struct NonceManager {
    last_issued: Mutex<i64>,
}

impl NonceManager {
    pub fn new() -> Self {
        Self {
            last_issued: Mutex::new(UNISSUED),
        }
    }

    /// Issue the next nonce for `sender`.
    pub async fn acquire(&self, client: &dyn ChainClient, sender: &Address) -> ChainResult<u64> {
        let mut last = self.last_issued.lock().await;
        let pending = client.pending_transaction_count(sender).await? as i64;
        let next = (*last).max(pending - 1) + 1;
        *last = next;
        debug!("Issued nonce {} (pending count {})", next, pending);
        Ok(next as u64)
    }
}

impl Default for NonceManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ChainError;
    use async_trait::async_trait;
    use drip_common::TxHash;
    use std::sync::atomic::{AtomicU64, Ordering};

    struct FixedCountClient {
        pending: AtomicU64,
    }

    impl FixedCountClient {
        fn new(pending: u64) -> Self {
            Self {
                pending: AtomicU64::new(pending),
            }
        }
    }

    #[async_trait]
    impl ChainClient for FixedCountClient {
        async fn balance(&self, _address: &Address) -> ChainResult<u128> {
            unimplemented!()
        }

        async fn gas_price(&self) -> ChainResult<u128> {
            unimplemented!()
        }

        async fn pending_transaction_count(&self, _address: &Address) -> ChainResult<u64> {
            Ok(self.pending.load(Ordering::SeqCst))
        }

        async fn chain_id(&self) -> ChainResult<u64> {
            unimplemented!()
        }

        async fn send_raw_transaction(&self, _raw: &[u8]) -> ChainResult<TxHash> {
            unimplemented!()
        }

        async fn wait_for_confirmation(&self, _hash: &TxHash) -> ChainResult<()> {
            unimplemented!()
        }
    }

    fn sender() -> Address {
        Address([0x11; 20])
    }

    #[tokio::test]
    async fn test_fresh_account_starts_at_zero() {
        let client = FixedCountClient::new(0);
        let nonces = NonceManager::new();
        assert_eq!(nonces.acquire(&client, &sender()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_sequential_acquisitions_never_repeat() {
        // Network count stays stale at 5 while this process issues nonces.
        let client = FixedCountClient::new(5);
        let nonces = NonceManager::new();

        let a = nonces.acquire(&client, &sender()).await.unwrap();
        let b = nonces.acquire(&client, &sender()).await.unwrap();
        let c = nonces.acquire(&client, &sender()).await.unwrap();

        assert_eq!((a, b, c), (5, 6, 7));
    }

    #[tokio::test]
    async fn test_resyncs_when_network_is_ahead() {
        let client = FixedCountClient::new(3);
        let nonces = NonceManager::new();
        assert_eq!(nonces.acquire(&client, &sender()).await.unwrap(), 3);

        // Another process pushed the account to 10 pending transactions.
        client.pending.store(10, Ordering::SeqCst);
        assert_eq!(nonces.acquire(&client, &sender()).await.unwrap(), 10);
    }

    #[tokio::test]
    async fn test_concurrent_acquisitions_are_distinct() {
        let client = std::sync::Arc::new(FixedCountClient::new(0));
        let nonces = std::sync::Arc::new(NonceManager::new());

        let mut handles = Vec::new();
        for _ in 0..8 {
            let client = client.clone();
            let nonces = nonces.clone();
            handles.push(tokio::spawn(async move {
                nonces.acquire(client.as_ref(), &sender()).await.unwrap()
            }));
        }

        let mut seen = std::collections::HashSet::new();
        for handle in handles {
            assert!(seen.insert(handle.await.unwrap()));
        }
        assert_eq!(seen.len(), 8);
    }

    #[tokio::test]
    async fn test_query_failure_leaves_counter_untouched() {
        struct FailingClient;

        #[async_trait]
        impl ChainClient for FailingClient {
            async fn balance(&self, _address: &Address) -> ChainResult<u128> {
                unimplemented!()
            }
            async fn gas_price(&self) -> ChainResult<u128> {
                unimplemented!()
            }
            async fn pending_transaction_count(&self, _address: &Address) -> ChainResult<u64> {
                Err(ChainError::Transport("connection refused".into()))
            }
            async fn chain_id(&self) -> ChainResult<u64> {
                unimplemented!()
            }
            async fn send_raw_transaction(&self, _raw: &[u8]) -> ChainResult<TxHash> {
                unimplemented!()
            }
            async fn wait_for_confirmation(&self, _hash: &TxHash) -> ChainResult<()> {
                unimplemented!()
            }
        }

        let nonces = NonceManager::new();
        assert!(nonces.acquire(&FailingClient, &sender()).await.is_err());

        let good = FixedCountClient::new(0);
        assert_eq!(nonces.acquire(&good, &sender()).await.unwrap(), 0);
    }
}
