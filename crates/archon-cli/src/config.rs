//! TOML configuration for the `archon` binary.
//!
//! The config supplies the orchestrator's tuning knobs and the recurring
//! task definitions — the host-side scheduling source. Every field has a
//! default so a minimal config (or none of the optional sections) still
//! produces a working engine.

use archon_core::TaskPayload;
use archon_orchestrator::{OrchestratorConfig, ScheduledTask};
use serde::Deserialize;
use std::time::Duration;

/// Top-level config file shape.
#[derive(Debug, Deserialize)]
pub struct ArchonConfig {
    /// Seconds between orchestrator ticks.
    #[serde(default = "default_tick_interval_secs")]
    pub tick_interval_secs: u64,
    /// Per-ping health check timeout, in seconds.
    #[serde(default = "default_health_timeout_secs")]
    pub health_timeout_secs: u64,
    /// Default per-dispatch timeout, in seconds.
    #[serde(default = "default_dispatch_timeout_secs")]
    pub dispatch_timeout_secs: u64,
    /// Upper bound on concurrent dispatches within one tick.
    #[serde(default = "default_max_concurrent_dispatches")]
    pub max_concurrent_dispatches: usize,
    /// Recurring task definitions supplied at startup.
    #[serde(default)]
    pub tasks: Vec<TaskConfig>,
}

/// One recurring task definition.
#[derive(Debug, Deserialize)]
pub struct TaskConfig {
    /// Unique task name.
    pub name: String,
    /// Name of the agent to dispatch to.
    pub target_agent: String,
    /// Recurrence interval, in seconds.
    pub interval_secs: u64,
    /// Action name the target agent understands.
    pub action: String,
    /// Optional JSON-like parameters for the action.
    #[serde(default)]
    pub params: Option<serde_json::Value>,
    /// Optional per-task dispatch timeout, in seconds.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// Whether the task starts enabled.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_tick_interval_secs() -> u64 {
    5
}
fn default_health_timeout_secs() -> u64 {
    5
}
fn default_dispatch_timeout_secs() -> u64 {
    30
}
fn default_max_concurrent_dispatches() -> usize {
    4
}
fn default_enabled() -> bool {
    true
}

impl ArchonConfig {
    /// The orchestrator tuning knobs this config describes.
    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            tick_interval: Duration::from_secs(self.tick_interval_secs),
            health_timeout: Duration::from_secs(self.health_timeout_secs),
            dispatch_timeout: Duration::from_secs(self.dispatch_timeout_secs),
            max_concurrent_dispatches: self.max_concurrent_dispatches,
        }
    }
}

impl TaskConfig {
    /// Build the scheduled task this entry describes.
    pub fn to_task(&self) -> ScheduledTask {
        let mut payload = TaskPayload::new(&self.action);
        if let Some(params) = &self.params {
            payload = payload.with_params(params.clone());
        }
        let mut task = ScheduledTask::new(
            &self.name,
            Duration::from_secs(self.interval_secs),
            &self.target_agent,
            payload,
        );
        if let Some(secs) = self.timeout_secs {
            task = task.with_timeout(Duration::from_secs(secs));
        }
        if !self.enabled {
            task = task.disabled();
        }
        task
    }
}
