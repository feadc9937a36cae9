use archon_core::{Agent, ArchonError, ArchonResult, HealthStatus, TaskOutcome, TaskPayload};
use async_trait::async_trait;

/// Content optimization agent.
///
/// Accepts `"optimize"` actions with a `content` string in the params:
/// trims the text, collapses runs of whitespace, and reports the size
/// reduction. Stateless and always healthy.
pub struct ContentOptimizationAgent;

impl ContentOptimizationAgent {
    /// Creates the agent.
    pub fn new() -> Self {
        Self
    }
}

impl Default for ContentOptimizationAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Agent for ContentOptimizationAgent {
    async fn ping(&self) -> ArchonResult<HealthStatus> {
        Ok(HealthStatus::Healthy)
    }

    async fn execute(&self, payload: &TaskPayload) -> ArchonResult<TaskOutcome> {
        if payload.action != "optimize" {
            return Err(ArchonError::AgentExecution(format!(
                "content agent does not support action '{}'",
                payload.action
            )));
        }

        let content = payload.params["content"].as_str().ok_or_else(|| {
            ArchonError::AgentExecution("optimize requires a 'content' string param".into())
        })?;

        let optimized = content.split_whitespace().collect::<Vec<_>>().join(" ");
        tracing::info!(
            original_len = content.len(),
            optimized_len = optimized.len(),
            "content optimized"
        );
        Ok(TaskOutcome::new("content optimized").with_data(serde_json::json!({
            "original_len": content.len(),
            "optimized_len": optimized.len(),
            "content": optimized,
        })))
    }
}
