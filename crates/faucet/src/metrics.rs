//! Prometheus metrics for the claim path.

use prometheus::{opts, Counter, Encoder, IntCounter, Registry, TextEncoder};
use tracing::warn;

/// Claim counters, exposed on `GET /metrics`.
pub struct FaucetMetrics {
    registry: Registry,

    pub claims_total: IntCounter,
    pub claims_rejected_total: IntCounter,
    pub wei_dispensed_total: Counter,
}

impl FaucetMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let claims_total = IntCounter::with_opts(opts!(
            "faucet_claims_total",
            "Total number of successful claims"
        ))?;

        let claims_rejected_total = IntCounter::with_opts(opts!(
            "faucet_claims_rejected_total",
            "Total number of rejected or failed claims"
        ))?;

        let wei_dispensed_total = Counter::with_opts(opts!(
            "faucet_wei_dispensed_total",
            "Total wei dispensed by successful claims"
        ))?;

        registry.register(Box::new(claims_total.clone()))?;
        registry.register(Box::new(claims_rejected_total.clone()))?;
        registry.register(Box::new(wei_dispensed_total.clone()))?;

        Ok(Self {
            registry,
            claims_total,
            claims_rejected_total,
            wei_dispensed_total,
        })
    }

    /// Text exposition of all registered metrics.
    pub fn encode(&self) -> String {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        if let Err(e) = encoder.encode(&self.registry.gather(), &mut buffer) {
            warn!("Failed to encode metrics: {}", e);
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_appear_in_exposition() {
        let metrics = FaucetMetrics::new().unwrap();
        metrics.claims_total.inc();
        metrics.wei_dispensed_total.inc_by(1e16);

        let text = metrics.encode();
        assert!(text.contains("faucet_claims_total 1"));
        assert!(text.contains("faucet_wei_dispensed_total"));
    }
}
