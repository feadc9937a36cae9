use archon_core::{HealthStatus, TaskPayload};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Tuning knobs for the orchestrator's control loop.
#[derive(Debug, Clone, Copy)]
pub struct OrchestratorConfig {
    /// Fixed interval between ticks.
    pub tick_interval: Duration,
    /// Timeout for a single agent ping during a health sweep.
    pub health_timeout: Duration,
    /// Default timeout for one dispatch; a task's own timeout takes precedence.
    pub dispatch_timeout: Duration,
    /// Upper bound on concurrently running dispatches within one tick.
    pub max_concurrent_dispatches: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(5),
            health_timeout: Duration::from_secs(5),
            dispatch_timeout: Duration::from_secs(30),
            max_concurrent_dispatches: 4,
        }
    }
}

/// A named recurring unit of dispatch.
///
/// `target_agent` is a name reference resolved at dispatch time; a dangling
/// reference is a dispatch-time failure, not a registration-time error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledTask {
    /// Unique task name.
    pub name: String,
    /// Recurrence interval. Must be greater than zero.
    pub interval: Duration,
    /// When this task next becomes due.
    pub next_fire_at: DateTime<Utc>,
    /// Name of the agent this task is dispatched to.
    pub target_agent: String,
    /// Opaque work description handed to the agent.
    pub payload: TaskPayload,
    /// Per-task dispatch timeout; falls back to the orchestrator default.
    pub timeout: Option<Duration>,
    /// Disabled tasks are never due and their schedule does not advance.
    pub enabled: bool,
}

impl ScheduledTask {
    /// Creates an enabled task whose first fire is one interval from now.
    pub fn new(
        name: impl Into<String>,
        interval: Duration,
        target_agent: impl Into<String>,
        payload: TaskPayload,
    ) -> Self {
        Self {
            name: name.into(),
            interval,
            next_fire_at: fire_after(Utc::now(), interval),
            target_agent: target_agent.into(),
            payload,
            timeout: None,
            enabled: true,
        }
    }

    /// Sets a per-task dispatch timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Creates the task disabled; it will not fire until re-enabled.
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Whether this task is due as of `now`.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.enabled && self.next_fire_at <= now
    }

    /// Resync the schedule to one interval past `now`.
    ///
    /// Catch-up semantics: however many intervals elapsed, the next fire is
    /// exactly `now + interval` — missed intervals are never back-filled.
    pub fn advance(&mut self, now: DateTime<Utc>) {
        self.next_fire_at = fire_after(now, self.interval);
    }
}

/// Computes `from + interval`, saturating at the calendar's end instead of
/// overflowing. Intervals beyond chrono's representable range land on
/// `MAX_UTC`, so an absurdly large interval means "never fires" rather than
/// a panic.
fn fire_after(from: DateTime<Utc>, interval: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(interval)
        .ok()
        .and_then(|delta| from.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Outcome of invoking one task on one agent.
///
/// Created per dispatch and handed to observers; the orchestrator itself
/// keeps no history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchResult {
    /// Unique id for this dispatch invocation.
    pub id: Uuid,
    /// Name of the task that fired.
    pub task_name: String,
    /// Name of the agent the task targeted.
    pub agent_name: String,
    /// Whether the agent completed the work.
    pub succeeded: bool,
    /// Error description when `succeeded` is false.
    pub error: Option<String>,
    /// Wall-clock duration of the dispatch.
    pub duration_ms: u64,
    /// When the dispatch finished.
    pub finished_at: DateTime<Utc>,
}

impl DispatchResult {
    /// Records a successful dispatch.
    pub fn success(
        task_name: impl Into<String>,
        agent_name: impl Into<String>,
        duration: Duration,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            task_name: task_name.into(),
            agent_name: agent_name.into(),
            succeeded: true,
            error: None,
            duration_ms: duration.as_millis() as u64,
            finished_at: Utc::now(),
        }
    }

    /// Records a failed dispatch with an error description.
    pub fn failure(
        task_name: impl Into<String>,
        agent_name: impl Into<String>,
        error: impl Into<String>,
        duration: Duration,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            task_name: task_name.into(),
            agent_name: agent_name.into(),
            succeeded: false,
            error: Some(error.into()),
            duration_ms: duration.as_millis() as u64,
            finished_at: Utc::now(),
        }
    }
}

/// Events emitted to observers (loggers, metrics sinks, dashboards).
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum OrchestratorEvent {
    /// A task was dispatched and produced a result.
    Dispatched(DispatchResult),
    /// A health sweep observed an agent's status change.
    AgentStatus {
        /// Agent whose status changed.
        agent: String,
        /// The newly observed status.
        status: HealthStatus,
    },
}

/// One agent's entry in a [`StatusSnapshot`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentStatusEntry {
    /// Registered agent name.
    pub name: String,
    /// Last observed health status.
    pub status: HealthStatus,
    /// Capabilities declared at registration.
    pub capabilities: Vec<String>,
}

/// Point-in-time view of orchestration state for operators.
#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    /// Whether the tick loop is running.
    pub running: bool,
    /// All registered agents in registration order.
    pub agents: Vec<AgentStatusEntry>,
    /// Total number of scheduled tasks.
    pub task_count: usize,
    /// Number of enabled tasks not yet due.
    pub pending_tasks: usize,
}
