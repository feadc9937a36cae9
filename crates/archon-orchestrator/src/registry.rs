use crate::types::AgentStatusEntry;
use archon_core::{Agent, ArchonError, ArchonResult, HealthStatus, Subsystem};
use std::collections::HashMap;
use std::sync::Arc;

struct AgentEntry {
    handle: Arc<dyn Agent>,
    capabilities: Vec<String>,
    status: HealthStatus,
}

/// Name→handle lookup for agents and subsystems.
///
/// The single source of truth for "what is registered". Agents and
/// subsystems live in separate namespaces; names are case-sensitive and
/// non-empty. Iteration order is registration order, kept stable so health
/// reports and tests are reproducible.
pub struct AgentRegistry {
    agents: HashMap<String, AgentEntry>,
    agent_order: Vec<String>,
    subsystems: HashMap<String, Arc<dyn Subsystem>>,
    subsystem_order: Vec<String>,
}

impl AgentRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            agents: HashMap::new(),
            agent_order: Vec::new(),
            subsystems: HashMap::new(),
            subsystem_order: Vec::new(),
        }
    }

    /// Register an agent under a unique name with its declared capabilities.
    ///
    /// Fails with [`ArchonError::DuplicateName`] if the name is taken; the
    /// original registration is left untouched. Status starts as
    /// [`HealthStatus::Unknown`] until a health sweep observes the agent.
    pub fn register_agent(
        &mut self,
        name: impl Into<String>,
        handle: Arc<dyn Agent>,
        capabilities: Vec<String>,
    ) -> ArchonResult<()> {
        let name = name.into();
        if name.is_empty() {
            return Err(ArchonError::Config("agent name must be non-empty".into()));
        }
        if self.agents.contains_key(&name) {
            return Err(ArchonError::DuplicateName(name));
        }
        tracing::info!(agent = %name, capabilities = ?capabilities, "agent registered");
        self.agents.insert(
            name.clone(),
            AgentEntry {
                handle,
                capabilities,
                status: HealthStatus::Unknown,
            },
        );
        self.agent_order.push(name);
        Ok(())
    }

    /// Register a subsystem handle; same contract as agents, separate namespace.
    pub fn register_subsystem(
        &mut self,
        name: impl Into<String>,
        handle: Arc<dyn Subsystem>,
    ) -> ArchonResult<()> {
        let name = name.into();
        if name.is_empty() {
            return Err(ArchonError::Config(
                "subsystem name must be non-empty".into(),
            ));
        }
        if self.subsystems.contains_key(&name) {
            return Err(ArchonError::DuplicateName(name));
        }
        tracing::info!(subsystem = %name, kind = handle.kind(), "subsystem registered");
        self.subsystems.insert(name.clone(), handle);
        self.subsystem_order.push(name);
        Ok(())
    }

    /// Remove an agent. Unhealthy agents are never removed automatically;
    /// this is the only way out of the registry.
    pub fn deregister_agent(&mut self, name: &str) -> ArchonResult<()> {
        if self.agents.remove(name).is_none() {
            return Err(ArchonError::UnknownAgent(name.to_string()));
        }
        self.agent_order.retain(|n| n != name);
        tracing::info!(agent = %name, "agent deregistered");
        Ok(())
    }

    /// Look up an agent handle. Returns `None` on miss.
    pub fn get_agent(&self, name: &str) -> Option<Arc<dyn Agent>> {
        self.agents.get(name).map(|e| e.handle.clone())
    }

    /// Look up a subsystem handle. Returns `None` on miss.
    pub fn get_subsystem(&self, name: &str) -> Option<Arc<dyn Subsystem>> {
        self.subsystems.get(name).cloned()
    }

    /// Snapshot of `(name, status)` pairs in registration order.
    pub fn list_agents(&self) -> Vec<(String, HealthStatus)> {
        self.agent_order
            .iter()
            .filter_map(|n| self.agents.get(n).map(|e| (n.clone(), e.status)))
            .collect()
    }

    /// Snapshot of `(name, handle)` pairs in registration order, for health sweeps.
    pub(crate) fn agent_handles(&self) -> Vec<(String, Arc<dyn Agent>)> {
        self.agent_order
            .iter()
            .filter_map(|n| self.agents.get(n).map(|e| (n.clone(), e.handle.clone())))
            .collect()
    }

    /// Full per-agent entries for status reporting, in registration order.
    pub fn status_entries(&self) -> Vec<AgentStatusEntry> {
        self.agent_order
            .iter()
            .filter_map(|n| {
                self.agents.get(n).map(|e| AgentStatusEntry {
                    name: n.clone(),
                    status: e.status,
                    capabilities: e.capabilities.clone(),
                })
            })
            .collect()
    }

    /// Update an agent's observed status. Called by the health monitor.
    pub fn set_status(&mut self, name: &str, status: HealthStatus) -> ArchonResult<()> {
        match self.agents.get_mut(name) {
            Some(entry) => {
                entry.status = status;
                Ok(())
            }
            None => Err(ArchonError::UnknownAgent(name.to_string())),
        }
    }

    /// Number of registered agents.
    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    /// Number of registered subsystems.
    pub fn subsystem_count(&self) -> usize {
        self.subsystems.len()
    }
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self::new()
    }
}
