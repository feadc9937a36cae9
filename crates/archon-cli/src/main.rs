//! The `archon` binary: config-driven host for the orchestration engine.

mod config;

use archon_orchestrator::{Orchestrator, OrchestratorEvent};
use clap::{Parser, Subcommand};
use config::ArchonConfig;
use std::path::PathBuf;
use tokio::sync::broadcast;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "archon", about = "Archon — Multi-Agent Orchestration Engine")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "archon.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the orchestration loop until interrupted
    Run,
    /// One-shot health sweep over the default agent roster
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    let cli = Cli::parse();

    let config_str = tokio::fs::read_to_string(&cli.config).await.map_err(|e| {
        anyhow::anyhow!(
            "Failed to read config file '{}': {}",
            cli.config.display(),
            e
        )
    })?;
    let config: ArchonConfig = toml::from_str(&config_str)?;

    let orchestrator = Orchestrator::new(config.orchestrator_config());
    archon_agents::register_defaults(&orchestrator).await?;

    match cli.command {
        Commands::Run => {
            for task in &config.tasks {
                orchestrator.add_scheduled_task(task.to_task()).await?;
            }
            info!(
                tasks = config.tasks.len(),
                tick_interval_secs = config.tick_interval_secs,
                "starting orchestrator"
            );

            // Forward engine events to the log; observability stays outside
            // the orchestration core.
            let mut events = orchestrator.subscribe();
            tokio::spawn(async move {
                loop {
                    match events.recv().await {
                        Ok(OrchestratorEvent::Dispatched(result)) => {
                            if result.succeeded {
                                info!(
                                    task = %result.task_name,
                                    agent = %result.agent_name,
                                    duration_ms = result.duration_ms,
                                    "dispatch complete"
                                );
                            } else {
                                warn!(
                                    task = %result.task_name,
                                    agent = %result.agent_name,
                                    error = result.error.as_deref().unwrap_or("unknown"),
                                    "dispatch failed"
                                );
                            }
                        }
                        Ok(OrchestratorEvent::AgentStatus { agent, status }) => {
                            info!(agent = %agent, status = %status, "agent status changed");
                        }
                        Err(broadcast::error::RecvError::Lagged(missed)) => {
                            warn!(missed, "event stream lagged");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
            });

            orchestrator.start().await?;
            tokio::signal::ctrl_c().await?;
            info!("shutdown requested, stopping after in-flight tick");
            orchestrator.stop().await;

            let snapshot = orchestrator.status_snapshot().await;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        Commands::Check => {
            orchestrator.tick(chrono::Utc::now()).await;
            let snapshot = orchestrator.status_snapshot().await;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
    }

    Ok(())
}
