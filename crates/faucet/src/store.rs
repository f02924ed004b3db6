//! Cooldown tracking.
//!
//! The cooldown store is the sole record of "when did this address last
//! claim". Keys are the address string exactly as the caller supplied it;
//! values are unix timestamps that expire after the cooldown window, so
//! absence always means eligible. The check-then-write around a claim is
//! deliberately not atomic.

use crate::error::FaucetResult;
use async_trait::async_trait;
use chrono::Utc;
use std::time::Duration;
use tracing::info;

/// Key-value store holding last-claim timestamps with per-key expiry.
#[async_trait]
pub trait CooldownStore: Send + Sync {
    /// Unix timestamp of the address's last claim, if still within the
    /// cooldown window.
    async fn last_claim(&self, address: &str) -> FaucetResult<Option<i64>>;

    /// Record a claim at `timestamp`, expiring after the cooldown window.
    async fn record_claim(&self, address: &str, timestamp: i64) -> FaucetResult<()>;
}

/// In-memory cooldown store; entries expire on their own.
pub struct MemoryCooldownStore {
    cache: moka::future::Cache<String, i64>,
}

impl MemoryCooldownStore {
    pub fn new(cooldown: Duration) -> Self {
        let cache = moka::future::Cache::builder()
            .max_capacity(100_000)
            .time_to_live(cooldown)
            .build();
        Self { cache }
    }
}

#[async_trait]
impl CooldownStore for MemoryCooldownStore {
    async fn last_claim(&self, address: &str) -> FaucetResult<Option<i64>> {
        Ok(self.cache.get(address).await)
    }

    async fn record_claim(&self, address: &str, timestamp: i64) -> FaucetResult<()> {
        self.cache.insert(address.to_string(), timestamp).await;
        Ok(())
    }
}

/// Sled-backed cooldown store; survives restarts.
///
/// Sled has no native expiry, so stale entries are treated as absent and
/// pruned on read.
pub struct SledCooldownStore {
    cooldowns: sled::Tree,
    cooldown_secs: i64,
}

impl SledCooldownStore {
    pub fn open(path: &str, cooldown: Duration) -> FaucetResult<Self> {
        info!("Opening cooldown store at: {}", path);
        let db = sled::open(path)?;
        let cooldowns = db.open_tree("cooldowns")?;
        Ok(Self {
            cooldowns,
            cooldown_secs: cooldown.as_secs() as i64,
        })
    }
}

#[async_trait]
impl CooldownStore for SledCooldownStore {
    async fn last_claim(&self, address: &str) -> FaucetResult<Option<i64>> {
        let bytes = match self.cooldowns.get(address.as_bytes())? {
            Some(bytes) => bytes,
            None => return Ok(None),
        };

        let timestamp = i64::from_be_bytes(
            bytes
                .as_ref()
                .try_into()
                .map_err(|_| sled::Error::Unsupported("corrupt cooldown timestamp".into()))?,
        );

        if Utc::now().timestamp() - timestamp >= self.cooldown_secs {
            self.cooldowns.remove(address.as_bytes())?;
            return Ok(None);
        }
        Ok(Some(timestamp))
    }

    async fn record_claim(&self, address: &str, timestamp: i64) -> FaucetResult<()> {
        self.cooldowns
            .insert(address.as_bytes(), timestamp.to_be_bytes().to_vec())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDR: &str = "0x1111111111111111111111111111111111111111";

    #[tokio::test]
    async fn test_memory_store_roundtrip() {
        let store = MemoryCooldownStore::new(Duration::from_secs(180));
        assert_eq!(store.last_claim(ADDR).await.unwrap(), None);

        store.record_claim(ADDR, 1_700_000_000).await.unwrap();
        assert_eq!(store.last_claim(ADDR).await.unwrap(), Some(1_700_000_000));
    }

    #[tokio::test]
    async fn test_memory_store_keys_are_case_sensitive() {
        let store = MemoryCooldownStore::new(Duration::from_secs(180));
        store.record_claim(ADDR, 1_700_000_000).await.unwrap();

        let upper = ADDR.to_uppercase().replace("0X", "0x");
        assert_eq!(store.last_claim(&upper).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_store_overwrites() {
        let store = MemoryCooldownStore::new(Duration::from_secs(180));
        store.record_claim(ADDR, 100).await.unwrap();
        store.record_claim(ADDR, 200).await.unwrap();
        assert_eq!(store.last_claim(ADDR).await.unwrap(), Some(200));
    }

    #[tokio::test]
    async fn test_sled_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store =
            SledCooldownStore::open(dir.path().to_str().unwrap(), Duration::from_secs(180))
                .unwrap();

        let now = Utc::now().timestamp();
        store.record_claim(ADDR, now).await.unwrap();
        assert_eq!(store.last_claim(ADDR).await.unwrap(), Some(now));
    }

    #[tokio::test]
    async fn test_sled_store_expires_stale_entries() {
        let dir = tempfile::tempdir().unwrap();
        let store =
            SledCooldownStore::open(dir.path().to_str().unwrap(), Duration::from_secs(180))
                .unwrap();

        let stale = Utc::now().timestamp() - 200;
        store.record_claim(ADDR, stale).await.unwrap();
        assert_eq!(store.last_claim(ADDR).await.unwrap(), None);
        // pruned, not just hidden
        assert!(store.cooldowns.get(ADDR.as_bytes()).unwrap().is_none());
    }
}
