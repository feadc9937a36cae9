use crate::monitor::HealthMonitor;
use crate::registry::AgentRegistry;
use crate::scheduler::TaskScheduler;
use crate::types::{
    DispatchResult, OrchestratorConfig, OrchestratorEvent, ScheduledTask, StatusSnapshot,
};
use archon_core::{Agent, ArchonError, ArchonResult, Subsystem};
use chrono::{DateTime, Utc};
use futures_util::stream::{self, StreamExt};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{broadcast, watch, Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Capacity of the observer event channel; a lagging subscriber loses old
/// events rather than blocking the tick loop.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// The public-facing coordinator: owns the tick loop and composes the
/// registry, health monitor, and task scheduler.
///
/// Lifecycle is a two-state machine, Stopped ⇄ Running. Each tick runs a
/// health sweep, then resolves due tasks, then dispatches them with bounded
/// parallelism. A failed or timed-out dispatch never halts the loop or
/// affects other tasks in the same tick.
pub struct Orchestrator {
    ctx: TickContext,
    running: Arc<AtomicBool>,
    shutdown: Mutex<Option<watch::Sender<bool>>>,
    loop_handle: Mutex<Option<JoinHandle<()>>>,
}

/// Everything a tick needs, cloneable into the spawned loop task.
#[derive(Clone)]
struct TickContext {
    config: OrchestratorConfig,
    registry: Arc<RwLock<AgentRegistry>>,
    scheduler: Arc<RwLock<TaskScheduler>>,
    monitor: Arc<HealthMonitor>,
    events: broadcast::Sender<OrchestratorEvent>,
    ticks: Arc<AtomicU64>,
}

impl Orchestrator {
    /// Creates a stopped orchestrator with the given configuration.
    pub fn new(config: OrchestratorConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            ctx: TickContext {
                monitor: Arc::new(HealthMonitor::new(config.health_timeout)),
                config,
                registry: Arc::new(RwLock::new(AgentRegistry::new())),
                scheduler: Arc::new(RwLock::new(TaskScheduler::new())),
                events,
                ticks: Arc::new(AtomicU64::new(0)),
            },
            running: Arc::new(AtomicBool::new(false)),
            shutdown: Mutex::new(None),
            loop_handle: Mutex::new(None),
        }
    }

    // --- Registration surface (delegates to the registry/scheduler) ---

    /// Register an agent under a unique name with its declared capabilities.
    pub async fn register_agent(
        &self,
        name: impl Into<String>,
        handle: Arc<dyn Agent>,
        capabilities: Vec<String>,
    ) -> ArchonResult<()> {
        self.ctx.registry.write().await.register_agent(name, handle, capabilities)
    }

    /// Register a named subsystem for lookup.
    pub async fn register_subsystem(
        &self,
        name: impl Into<String>,
        handle: Arc<dyn Subsystem>,
    ) -> ArchonResult<()> {
        self.ctx.registry.write().await.register_subsystem(name, handle)
    }

    /// Remove an agent from the registry.
    pub async fn deregister_agent(&self, name: &str) -> ArchonResult<()> {
        self.ctx.registry.write().await.deregister_agent(name)
    }

    /// Look up a registered subsystem handle.
    pub async fn subsystem(&self, name: &str) -> Option<Arc<dyn Subsystem>> {
        self.ctx.registry.read().await.get_subsystem(name)
    }

    /// Add a recurring task to the scheduler.
    pub async fn add_scheduled_task(&self, task: ScheduledTask) -> ArchonResult<()> {
        self.ctx.scheduler.write().await.add_task(task)
    }

    /// Remove a scheduled task by name.
    pub async fn remove_scheduled_task(&self, name: &str) -> ArchonResult<()> {
        self.ctx.scheduler.write().await.remove_task(name)
    }

    /// Enable or disable a scheduled task.
    pub async fn set_task_enabled(&self, name: &str, enabled: bool) -> ArchonResult<()> {
        self.ctx.scheduler.write().await.set_enabled(name, enabled)
    }

    // --- Lifecycle ---

    /// Start the tick loop.
    ///
    /// Idempotent: calling `start` while already running is a no-op that
    /// returns success — a second loop is never spawned.
    pub async fn start(&self) -> ArchonResult<()> {
        if self.running.swap(true, Ordering::SeqCst) {
            debug!("orchestrator already running, start is a no-op");
            return Ok(());
        }

        let (tx, mut rx) = watch::channel(false);
        let ctx = self.ctx.clone();
        let running = self.running.clone();

        let handle = tokio::spawn(async move {
            info!(tick_interval = ?ctx.config.tick_interval, "orchestrator loop started");
            let mut ticker = tokio::time::interval(ctx.config.tick_interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        // The tick body runs to completion once selected, so
                        // stop() never cancels an in-flight dispatch.
                        ctx.tick(Utc::now()).await;
                    }
                    _ = rx.changed() => break,
                }
            }
            running.store(false, Ordering::SeqCst);
            info!("orchestrator loop stopped");
        });

        *self.shutdown.lock().await = Some(tx);
        *self.loop_handle.lock().await = Some(handle);
        Ok(())
    }

    /// Stop the tick loop, letting any in-flight tick finish first.
    ///
    /// A no-op when already stopped. `start` may be called again afterwards.
    pub async fn stop(&self) {
        let tx = self.shutdown.lock().await.take();
        if let Some(tx) = tx {
            let _ = tx.send(true);
        }
        let handle = self.loop_handle.lock().await.take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
        self.running.store(false, Ordering::SeqCst);
    }

    /// Whether the tick loop is currently running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Number of ticks completed since construction, by the loop or by
    /// manual [`Orchestrator::tick`] calls.
    pub fn ticks_completed(&self) -> u64 {
        self.ctx.ticks.load(Ordering::SeqCst)
    }

    // --- Orchestration ---

    /// Run one full tick as of `now`: health sweep, due-task resolution,
    /// then dispatch. The spawned loop calls this; hosts and tests may also
    /// drive it manually on a stopped orchestrator.
    pub async fn tick(&self, now: DateTime<Utc>) -> Vec<DispatchResult> {
        self.ctx.tick(now).await
    }

    /// Force-fire one named task immediately, bypassing its interval.
    ///
    /// The task's regular schedule is left untouched. Returns the dispatch
    /// result, or [`ArchonError::UnknownTask`] if no such task exists.
    pub async fn dispatch_now(&self, task_name: &str) -> ArchonResult<DispatchResult> {
        let task = self
            .ctx
            .scheduler
            .read()
            .await
            .get(task_name)
            .cloned()
            .ok_or_else(|| ArchonError::UnknownTask(task_name.to_string()))?;

        info!(task = %task.name, "manual dispatch requested");
        let result = self.ctx.dispatch(task).await;
        let _ = self.ctx.events.send(OrchestratorEvent::Dispatched(result.clone()));
        Ok(result)
    }

    /// Subscribe to dispatch results and agent status changes.
    pub fn subscribe(&self) -> broadcast::Receiver<OrchestratorEvent> {
        self.ctx.events.subscribe()
    }

    /// Point-in-time view of agent statuses and scheduled work, safe to call
    /// from any thread while the loop runs.
    pub async fn status_snapshot(&self) -> StatusSnapshot {
        let agents = self.ctx.registry.read().await.status_entries();
        let scheduler = self.ctx.scheduler.read().await;
        StatusSnapshot {
            running: self.is_running(),
            agents,
            task_count: scheduler.task_count(),
            pending_tasks: scheduler.pending_count(Utc::now()),
        }
    }
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new(OrchestratorConfig::default())
    }
}

impl TickContext {
    /// One tick: health first so dispatch sees fresh statuses, then due
    /// tasks in deterministic order, dispatched with bounded parallelism.
    async fn tick(&self, now: DateTime<Utc>) -> Vec<DispatchResult> {
        let before = self.registry.read().await.list_agents();
        let after = self.monitor.check_all(&self.registry).await;
        for (name, status) in &after {
            let changed = before
                .iter()
                .find(|(n, _)| n == name)
                .map_or(true, |(_, old)| old != status);
            if changed {
                let _ = self.events.send(OrchestratorEvent::AgentStatus {
                    agent: name.clone(),
                    status: *status,
                });
            }
        }

        let due = self.scheduler.write().await.due_tasks(now);
        if due.is_empty() {
            self.ticks.fetch_add(1, Ordering::SeqCst);
            return Vec::new();
        }
        debug!(due = due.len(), "dispatching due tasks");

        let results: Vec<DispatchResult> = stream::iter(due.into_iter().map(|task| self.dispatch(task)))
            .buffer_unordered(self.config.max_concurrent_dispatches.max(1))
            .collect()
            .await;

        for result in &results {
            let _ = self.events.send(OrchestratorEvent::Dispatched(result.clone()));
        }
        self.ticks.fetch_add(1, Ordering::SeqCst);
        results
    }

    /// Invoke one task on its target agent, capturing a [`DispatchResult`].
    ///
    /// Every failure mode — unresolved agent, timeout, reported error — is
    /// recorded in the result; nothing propagates out of the tick.
    async fn dispatch(&self, task: ScheduledTask) -> DispatchResult {
        let start = Instant::now();

        let Some(agent) = self.registry.read().await.get_agent(&task.target_agent) else {
            warn!(task = %task.name, agent = %task.target_agent, "dispatch target not registered");
            return DispatchResult::failure(
                task.name,
                task.target_agent,
                "unknown agent",
                start.elapsed(),
            );
        };

        let timeout = task.timeout.unwrap_or(self.config.dispatch_timeout);
        match tokio::time::timeout(timeout, agent.execute(&task.payload)).await {
            Ok(Ok(outcome)) => {
                info!(
                    task = %task.name,
                    agent = %task.target_agent,
                    summary = %outcome.summary,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "dispatch succeeded"
                );
                DispatchResult::success(task.name, task.target_agent, start.elapsed())
            }
            Ok(Err(e)) => {
                warn!(task = %task.name, agent = %task.target_agent, error = %e, "dispatch failed");
                DispatchResult::failure(task.name, task.target_agent, e.to_string(), start.elapsed())
            }
            Err(_) => {
                let err = ArchonError::AgentTimeout {
                    agent: task.target_agent.clone(),
                    timeout,
                };
                warn!(task = %task.name, agent = %task.target_agent, "dispatch timed out");
                DispatchResult::failure(task.name, task.target_agent, err.to_string(), start.elapsed())
            }
        }
    }
}
