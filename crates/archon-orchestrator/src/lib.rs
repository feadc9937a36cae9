//! Multi-agent orchestration engine with agent registry, health monitoring,
//! and interval-based task scheduling.
//!
//! A central [`Orchestrator`] registers named agents and subsystems, runs a
//! fixed-interval tick loop, health-polls every agent, and dispatches due
//! recurring tasks to their target agents with bounded parallelism and
//! per-dispatch timeouts. Failures are isolated per dispatch and surfaced to
//! observers; nothing a single agent does can halt the loop.
//!
//! # Main types
//!
//! - [`Orchestrator`] — Top-level coordinator owning the tick loop.
//! - [`AgentRegistry`] — Name→handle lookup for agents and subsystems.
//! - [`HealthMonitor`] — Timeout-bounded concurrent ping sweeps.
//! - [`TaskScheduler`] — Recurring tasks with catch-up fire semantics.
//! - [`DispatchResult`] — Outcome of invoking one task on one agent.

/// Orchestration engine and tick loop.
pub mod engine;
/// Agent health sweeps.
pub mod monitor;
/// Agent and subsystem registration.
pub mod registry;
/// Recurring task scheduling.
pub mod scheduler;
/// Shared orchestration types (ScheduledTask, DispatchResult, events).
pub mod types;

pub use engine::Orchestrator;
pub use monitor::HealthMonitor;
pub use registry::AgentRegistry;
pub use scheduler::TaskScheduler;
pub use types::{
    AgentStatusEntry, DispatchResult, OrchestratorConfig, OrchestratorEvent, ScheduledTask,
    StatusSnapshot,
};
