//! Core types and contracts for the Archon orchestration engine.
//!
//! This crate provides the foundational pieces shared across all Archon
//! crates: the unified error enum, the health-status model, task payloads
//! and outcomes, and the [`Agent`] / [`Subsystem`] contracts every
//! registered collaborator must satisfy.
//!
//! # Main types
//!
//! - [`ArchonError`] — Unified error enum for all Archon subsystems.
//! - [`ArchonResult`] — Convenience alias for `Result<T, ArchonError>`.
//! - [`HealthStatus`] — Liveness/capability status of a registered agent.
//! - [`TaskPayload`] — Opaque work description handed to an agent.
//! - [`TaskOutcome`] — What an agent reports back after executing a payload.
//! - [`Agent`] — The ping/execute contract consumed by the orchestrator.
//! - [`Subsystem`] — A named auxiliary service registered for lookup.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

// --- Error types ---

/// Top-level error type for the Archon engine.
///
/// All recoverable conditions are reported through these variants; none of
/// them terminate the tick loop or the orchestrator process.
#[derive(Debug, thiserror::Error)]
pub enum ArchonError {
    /// An agent, subsystem, or task was registered under a name already in use.
    #[error("duplicate name: '{0}' is already registered")]
    DuplicateName(String),

    /// A lookup or status update referenced an agent that is not registered.
    #[error("unknown agent: '{0}'")]
    UnknownAgent(String),

    /// An operation referenced a scheduled task that does not exist.
    #[error("unknown task: '{0}'")]
    UnknownTask(String),

    /// A health check or dispatch did not return within its timeout.
    #[error("agent '{agent}' timed out after {timeout:?}")]
    AgentTimeout {
        /// Name of the unresponsive agent.
        agent: String,
        /// The timeout that elapsed.
        timeout: Duration,
    },

    /// An agent responded but reported an internal failure.
    #[error("agent execution error: {0}")]
    AgentExecution(String),

    /// An error in configuration parsing or validation.
    #[error("config error: {0}")]
    Config(String),

    /// A JSON serialization or deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenience `Result` alias using [`ArchonError`].
pub type ArchonResult<T> = Result<T, ArchonError>;

// --- Health model ---

/// Liveness/capability status of a registered agent.
///
/// Status is mutated only by the health monitor; agents start as
/// [`HealthStatus::Unknown`] until the first sweep observes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Not yet observed by a health sweep.
    Unknown,
    /// The agent responded cleanly to its last ping.
    Healthy,
    /// The agent responded but reported an internal failure.
    Degraded,
    /// The agent did not respond within the health-check timeout.
    Unreachable,
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Unknown => write!(f, "unknown"),
            HealthStatus::Healthy => write!(f, "healthy"),
            HealthStatus::Degraded => write!(f, "degraded"),
            HealthStatus::Unreachable => write!(f, "unreachable"),
        }
    }
}

// --- Task payloads and outcomes ---

/// An opaque unit of work handed to an agent at dispatch time.
///
/// The orchestrator never interprets the payload; `action` names what the
/// agent should do and `params` carries task-specific data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskPayload {
    /// Action name the target agent understands (e.g. `"generate"`).
    pub action: String,
    /// Arbitrary JSON parameters for the action.
    #[serde(default)]
    pub params: serde_json::Value,
}

impl TaskPayload {
    /// Creates a payload with the given action and no parameters.
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            params: serde_json::Value::Null,
        }
    }

    /// Attaches JSON parameters to the payload.
    #[must_use]
    pub fn with_params(mut self, params: serde_json::Value) -> Self {
        self.params = params;
        self
    }
}

/// What an agent reports back after successfully executing a payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskOutcome {
    /// Human-readable summary of what the agent did.
    pub summary: String,
    /// Optional structured result data.
    pub data: Option<serde_json::Value>,
}

impl TaskOutcome {
    /// Creates an outcome with a summary and no structured data.
    pub fn new(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            data: None,
        }
    }

    /// Attaches structured result data to the outcome.
    #[must_use]
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}

// --- Collaborator contracts ---

/// The contract every registered agent must satisfy.
///
/// `ping` answers "are you alive, and what shape are you in"; `execute`
/// performs one unit of dispatched work. What "healthy" means is the agent's
/// business — the orchestrator only records what it is told. An `Err` from
/// either method is a reported internal failure, not a transport problem;
/// timeouts are enforced by the caller, not the agent.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Report current liveness. A clean agent returns [`HealthStatus::Healthy`];
    /// an agent in a bad-but-responsive state may return
    /// [`HealthStatus::Degraded`] directly.
    async fn ping(&self) -> ArchonResult<HealthStatus>;

    /// Execute one task payload and report the outcome.
    async fn execute(&self, payload: &TaskPayload) -> ArchonResult<TaskOutcome>;
}

/// A named auxiliary service registered alongside agents but not health-polled.
///
/// Subsystems (a storage vault, an inference client) are registered for
/// lookup only; the orchestrator holds a non-owning handle and never calls
/// into them itself.
pub trait Subsystem: Send + Sync {
    /// A short machine-readable kind tag (e.g. `"storage-vault"`).
    fn kind(&self) -> &str;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_health_status_display() {
        assert_eq!(HealthStatus::Healthy.to_string(), "healthy");
        assert_eq!(HealthStatus::Unreachable.to_string(), "unreachable");
    }

    #[test]
    fn test_health_status_serialization() {
        let json = serde_json::to_string(&HealthStatus::Degraded).unwrap();
        assert_eq!(json, "\"degraded\"");
        let parsed: HealthStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, HealthStatus::Degraded);
    }

    #[test]
    fn test_payload_builder() {
        let payload = TaskPayload::new("generate")
            .with_params(serde_json::json!({"theme": "abstract"}));
        assert_eq!(payload.action, "generate");
        assert_eq!(payload.params["theme"], "abstract");
    }

    #[test]
    fn test_payload_params_default_on_deserialize() {
        let payload: TaskPayload = serde_json::from_str(r#"{"action": "audit"}"#).unwrap();
        assert_eq!(payload.action, "audit");
        assert!(payload.params.is_null());
    }

    #[test]
    fn test_outcome_builder() {
        let outcome = TaskOutcome::new("done").with_data(serde_json::json!({"count": 3}));
        assert_eq!(outcome.summary, "done");
        assert_eq!(outcome.data.unwrap()["count"], 3);
    }

    #[test]
    fn test_error_display() {
        let err = ArchonError::DuplicateName("huraii".into());
        assert_eq!(err.to_string(), "duplicate name: 'huraii' is already registered");

        let err = ArchonError::AgentTimeout {
            agent: "cloe".into(),
            timeout: Duration::from_secs(5),
        };
        assert!(err.to_string().contains("cloe"));
        assert!(err.to_string().contains("5s"));
    }
}
