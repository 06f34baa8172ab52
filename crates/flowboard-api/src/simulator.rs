// ── Remote simulator ──
//
// Stands in for the backend. Every call suspends for the configured
// latency, then resolves according to the decider. Successful creates
// mint a canonical id; everything else returns a bare acknowledgement.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tracing::{debug, trace};
use uuid::Uuid;

use crate::decider::{OutcomeDecider, RandomFailures, Verdict};
use crate::error::Error;
use crate::types::{Ack, NewItem, Operation, RemoteItem};

const DEFAULT_LATENCY: Duration = Duration::from_millis(1500);
const DEFAULT_FAILURE_RATE: f64 = 0.2;

/// Latency and failure-rate tuning for [`RemoteSimulator`].
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatorConfig {
    /// How long every call suspends before resolving.
    pub latency: Duration,
    /// Probability in `[0, 1]` that a call fails (random decider only).
    pub failure_rate: f64,
    /// Seed for the random decider. `None` seeds from entropy.
    pub rng_seed: Option<u64>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            latency: DEFAULT_LATENCY,
            failure_rate: DEFAULT_FAILURE_RATE,
            rng_seed: None,
        }
    }
}

impl SimulatorConfig {
    pub fn validate(&self) -> Result<(), Error> {
        if !(0.0..=1.0).contains(&self.failure_rate) {
            return Err(Error::InvalidConfig {
                reason: format!(
                    "failure_rate must be within [0, 1], got {}",
                    self.failure_rate
                ),
            });
        }
        Ok(())
    }
}

/// The unreliable backend.
///
/// Cheaply cloneable; clones share the decider and the call counter.
#[derive(Debug, Clone)]
pub struct RemoteSimulator {
    inner: Arc<SimulatorInner>,
}

#[derive(Debug)]
struct SimulatorInner {
    config: SimulatorConfig,
    decider: Arc<dyn OutcomeDecider>,
    calls: AtomicU64,
}

impl RemoteSimulator {
    /// Build a simulator with random failure injection at `config.failure_rate`.
    pub fn new(config: SimulatorConfig) -> Result<Self, Error> {
        config.validate()?;
        let decider = Arc::new(RandomFailures::new(config.failure_rate, config.rng_seed));
        Ok(Self::build(config, decider))
    }

    /// Build a simulator with an explicit decider. The configured failure
    /// rate is still validated but only the decider picks outcomes.
    pub fn with_decider(
        config: SimulatorConfig,
        decider: Arc<dyn OutcomeDecider>,
    ) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self::build(config, decider))
    }

    fn build(config: SimulatorConfig, decider: Arc<dyn OutcomeDecider>) -> Self {
        Self {
            inner: Arc::new(SimulatorInner {
                config,
                decider,
                calls: AtomicU64::new(0),
            }),
        }
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.inner.config
    }

    /// Total number of calls issued so far.
    pub fn calls(&self) -> u64 {
        self.inner.calls.load(Ordering::Relaxed)
    }

    // ── Operations ───────────────────────────────────────────────────

    /// Confirm a creation, minting a canonical id for it.
    pub async fn create(&self, item: NewItem) -> Result<RemoteItem, Error> {
        self.resolve(Operation::Create, &item.provisional_id).await?;
        let canonical = Uuid::new_v4().to_string();
        debug!(provisional = %item.provisional_id, canonical = %canonical, "minted canonical id");
        Ok(RemoteItem {
            id: canonical,
            title: item.title,
            stage: item.stage,
            created_at: item.created_at,
        })
    }

    pub async fn relocate(&self, id: &str, from: &str, to: &str) -> Result<Ack, Error> {
        trace!(id, from, to, "relocate requested");
        self.resolve(Operation::Relocate, id).await?;
        Ok(ack(Operation::Relocate, id))
    }

    pub async fn remove(&self, id: &str) -> Result<Ack, Error> {
        self.resolve(Operation::Remove, id).await?;
        Ok(ack(Operation::Remove, id))
    }

    pub async fn rename(&self, id: &str, title: &str) -> Result<Ack, Error> {
        trace!(id, title, "rename requested");
        self.resolve(Operation::Rename, id).await?;
        Ok(ack(Operation::Rename, id))
    }

    // ── Private helpers ──────────────────────────────────────────────

    /// Wait out the latency window, then ask the decider.
    async fn resolve(&self, operation: Operation, id: &str) -> Result<(), Error> {
        self.inner.calls.fetch_add(1, Ordering::Relaxed);
        debug!(%operation, id, latency = ?self.inner.config.latency, "remote call issued");

        tokio::time::sleep(self.inner.config.latency).await;

        match self.inner.decider.decide(operation) {
            Verdict::Succeed => {
                debug!(%operation, id, "remote call succeeded");
                Ok(())
            }
            Verdict::Fail => {
                debug!(%operation, id, "remote call failed (simulated)");
                Err(Error::Simulated {
                    operation,
                    reason: operation.failure_reason().to_owned(),
                })
            }
            Verdict::Malformed => Err(Error::MalformedResponse {
                operation,
                detail: format!("response for {id} could not be decoded"),
            }),
        }
    }
}

fn ack(operation: Operation, id: &str) -> Ack {
    Ack {
        operation,
        id: id.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_documented_values() {
        let cfg = SimulatorConfig::default();
        assert_eq!(cfg.latency, Duration::from_millis(1500));
        assert!((cfg.failure_rate - 0.2).abs() < f64::EPSILON);
        assert!(cfg.rng_seed.is_none());
    }

    #[test]
    fn rejects_out_of_range_failure_rate() {
        for rate in [-0.1, 1.5, f64::NAN] {
            let cfg = SimulatorConfig {
                failure_rate: rate,
                ..SimulatorConfig::default()
            };
            assert!(
                matches!(RemoteSimulator::new(cfg), Err(Error::InvalidConfig { .. })),
                "rate {rate} should be rejected"
            );
        }
    }
}
