use archon_core::{Agent, ArchonError, ArchonResult, HealthStatus, TaskOutcome, TaskPayload};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Generative workload agent with a bounded backlog.
///
/// Accepts `"generate"` actions. The host enqueues pending work with
/// [`GenerationAgent::enqueue`]; each dispatch drains one item. When the
/// backlog exceeds the queue limit the agent reports itself
/// [`HealthStatus::Degraded`] so operators see the pressure in status
/// snapshots instead of silently growing a queue.
pub struct GenerationAgent {
    queue_limit: usize,
    backlog: AtomicUsize,
    generated: AtomicU64,
}

impl GenerationAgent {
    /// Default backlog size before the agent reports itself degraded.
    pub const DEFAULT_QUEUE_LIMIT: usize = 32;

    /// Creates an agent that degrades past the given backlog size.
    pub fn new(queue_limit: usize) -> Self {
        Self {
            queue_limit,
            backlog: AtomicUsize::new(0),
            generated: AtomicU64::new(0),
        }
    }

    /// Add one pending work item; returns the new backlog depth.
    pub fn enqueue(&self) -> usize {
        self.backlog.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Total works produced since construction.
    pub fn generated(&self) -> u64 {
        self.generated.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Agent for GenerationAgent {
    async fn ping(&self) -> ArchonResult<HealthStatus> {
        if self.backlog.load(Ordering::SeqCst) > self.queue_limit {
            Ok(HealthStatus::Degraded)
        } else {
            Ok(HealthStatus::Healthy)
        }
    }

    async fn execute(&self, payload: &TaskPayload) -> ArchonResult<TaskOutcome> {
        if payload.action != "generate" {
            return Err(ArchonError::AgentExecution(format!(
                "generation agent does not support action '{}'",
                payload.action
            )));
        }

        // Drain one backlog item if any; scheduled generation runs regardless.
        let _ = self
            .backlog
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        let total = self.generated.fetch_add(1, Ordering::SeqCst) + 1;

        let theme = payload.params["theme"].as_str().unwrap_or("untitled");
        tracing::info!(theme, total, "generated work");
        Ok(TaskOutcome::new(format!("generated '{theme}'")).with_data(serde_json::json!({
            "theme": theme,
            "works_generated": total,
        })))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_generate_counts_works() {
        let agent = GenerationAgent::new(4);
        let payload = TaskPayload::new("generate")
            .with_params(serde_json::json!({"theme": "dusk"}));

        let outcome = agent.execute(&payload).await.unwrap();
        assert_eq!(outcome.summary, "generated 'dusk'");
        assert_eq!(agent.generated(), 1);
        assert_eq!(outcome.data.unwrap()["works_generated"], 1);
    }

    #[tokio::test]
    async fn test_degraded_past_queue_limit() {
        let agent = GenerationAgent::new(2);
        assert_eq!(agent.ping().await.unwrap(), HealthStatus::Healthy);

        for _ in 0..3 {
            agent.enqueue();
        }
        assert_eq!(agent.ping().await.unwrap(), HealthStatus::Degraded);

        // Draining one item brings it back under the limit.
        agent.execute(&TaskPayload::new("generate")).await.unwrap();
        assert_eq!(agent.ping().await.unwrap(), HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn test_unsupported_action() {
        let agent = GenerationAgent::new(4);
        let err = agent.execute(&TaskPayload::new("audit")).await.unwrap_err();
        assert!(matches!(err, ArchonError::AgentExecution(msg) if msg.contains("audit")));
    }
}
