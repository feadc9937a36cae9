use crate::registry::AgentRegistry;
use archon_core::HealthStatus;
use futures_util::future::join_all;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::warn;

/// Periodically asks every registered agent "are you alive, and what can
/// you do" and writes the answers back into the registry.
///
/// A ping that does not return within the timeout marks the agent
/// [`HealthStatus::Unreachable`]; an agent that responds with an error is
/// [`HealthStatus::Degraded`]. Neither is deregistered — the status stays
/// visible until the agent recovers and a later sweep observes it.
pub struct HealthMonitor {
    timeout: Duration,
}

impl HealthMonitor {
    /// Creates a monitor with the given per-ping timeout.
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// The configured per-ping timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run one health sweep over every registered agent.
    ///
    /// Pings run concurrently; no registry lock is held while waiting on
    /// agents, so a slow agent cannot stall registration or snapshots.
    /// Returns the freshly observed `(name, status)` pairs in registration
    /// order.
    pub async fn check_all(&self, registry: &RwLock<AgentRegistry>) -> Vec<(String, HealthStatus)> {
        let targets = registry.read().await.agent_handles();

        let sweeps = targets.into_iter().map(|(name, handle)| async move {
            let status = match tokio::time::timeout(self.timeout, handle.ping()).await {
                Ok(Ok(status)) => status,
                Ok(Err(e)) => {
                    warn!(agent = %name, error = %e, "agent reported failure on ping");
                    HealthStatus::Degraded
                }
                Err(_) => {
                    warn!(agent = %name, timeout = ?self.timeout, "agent ping timed out");
                    HealthStatus::Unreachable
                }
            };
            (name, status)
        });
        let results = join_all(sweeps).await;

        let mut registry = registry.write().await;
        for (name, status) in &results {
            // The agent may have been deregistered mid-sweep; a miss is fine.
            let _ = registry.set_status(name, *status);
        }
        results
    }
}

impl Default for HealthMonitor {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}
