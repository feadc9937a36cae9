use archon_core::{Agent, ArchonError, ArchonResult, HealthStatus, TaskOutcome, TaskPayload};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};

/// Market analysis agent.
///
/// Accepts `"analyze_market"` actions and returns a small structured
/// analysis derived from the payload parameters. Always healthy; it holds
/// no external connections.
pub struct MarketAnalysisAgent {
    analyses: AtomicU64,
}

impl MarketAnalysisAgent {
    /// Creates the agent with a zeroed analysis counter.
    pub fn new() -> Self {
        Self {
            analyses: AtomicU64::new(0),
        }
    }

    /// Total analyses performed since construction.
    pub fn analyses(&self) -> u64 {
        self.analyses.load(Ordering::SeqCst)
    }
}

impl Default for MarketAnalysisAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Agent for MarketAnalysisAgent {
    async fn ping(&self) -> ArchonResult<HealthStatus> {
        Ok(HealthStatus::Healthy)
    }

    async fn execute(&self, payload: &TaskPayload) -> ArchonResult<TaskOutcome> {
        if payload.action != "analyze_market" {
            return Err(ArchonError::AgentExecution(format!(
                "market agent does not support action '{}'",
                payload.action
            )));
        }

        let collection = payload.params["collection"].as_str().unwrap_or("all");
        let window_hours = payload.params["window_hours"].as_u64().unwrap_or(24);
        let run = self.analyses.fetch_add(1, Ordering::SeqCst) + 1;

        tracing::info!(collection, window_hours, run, "market analysis complete");
        Ok(
            TaskOutcome::new(format!("analyzed '{collection}' over {window_hours}h")).with_data(
                serde_json::json!({
                    "collection": collection,
                    "window_hours": window_hours,
                    "analyses_run": run,
                }),
            ),
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_analyze_with_params() {
        let agent = MarketAnalysisAgent::new();
        let payload = TaskPayload::new("analyze_market")
            .with_params(serde_json::json!({"collection": "genesis", "window_hours": 6}));

        let outcome = agent.execute(&payload).await.unwrap();
        assert_eq!(outcome.summary, "analyzed 'genesis' over 6h");
        assert_eq!(agent.analyses(), 1);
    }

    #[tokio::test]
    async fn test_analyze_defaults() {
        let agent = MarketAnalysisAgent::new();
        let outcome = agent.execute(&TaskPayload::new("analyze_market")).await.unwrap();
        let data = outcome.data.unwrap();
        assert_eq!(data["collection"], "all");
        assert_eq!(data["window_hours"], 24);
    }

    #[tokio::test]
    async fn test_unsupported_action() {
        let agent = MarketAnalysisAgent::new();
        assert!(agent.execute(&TaskPayload::new("generate")).await.is_err());
    }
}
