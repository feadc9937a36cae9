//! Ready-to-use reference agents for the Archon orchestration engine.
//!
//! Each agent implements the [`archon_core::Agent`] ping/execute contract
//! with small, deterministic, dependency-free behavior, covering the four
//! canonical roles the engine is typically deployed with: generative work,
//! market analysis, content optimization, and security monitoring.
//!
//! # Main entry points
//!
//! - [`register_defaults()`] — Register the standard four-agent roster.
//! - [`GenerationAgent`] — Generative workload with a bounded backlog.
//! - [`MarketAnalysisAgent`] — Market trend analysis over payload params.
//! - [`ContentOptimizationAgent`] — Content cleanup and scoring.
//! - [`SecurityMonitorAgent`] — Audit sweeps with a running count.

/// Content optimization agent.
pub mod content;
/// Generative workload agent.
pub mod generation;
/// Market analysis agent.
pub mod market;
/// Security monitoring agent.
pub mod security;

pub use content::ContentOptimizationAgent;
pub use generation::GenerationAgent;
pub use market::MarketAnalysisAgent;
pub use security::SecurityMonitorAgent;

use archon_core::ArchonResult;
use archon_orchestrator::Orchestrator;
use std::sync::Arc;

/// Register the standard four-agent roster under its canonical names.
///
/// `huraii` (generation), `cloe` (market analysis), `horace` (content
/// optimization), and `thorius` (security monitoring). Fails if any of the
/// names is already taken.
pub async fn register_defaults(orchestrator: &Orchestrator) -> ArchonResult<()> {
    orchestrator
        .register_agent(
            "huraii",
            Arc::new(GenerationAgent::new(GenerationAgent::DEFAULT_QUEUE_LIMIT)),
            vec!["generate".into()],
        )
        .await?;
    orchestrator
        .register_agent(
            "cloe",
            Arc::new(MarketAnalysisAgent::new()),
            vec!["analyze_market".into()],
        )
        .await?;
    orchestrator
        .register_agent(
            "horace",
            Arc::new(ContentOptimizationAgent::new()),
            vec!["optimize".into()],
        )
        .await?;
    orchestrator
        .register_agent(
            "thorius",
            Arc::new(SecurityMonitorAgent::new()),
            vec!["audit".into()],
        )
        .await?;
    Ok(())
}
