use super::builtin;
use super::Agent;
use crate::error::{AgentError, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Health report for one registered agent, produced by [`Registry::doctor`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentStatus {
    pub name: String,
    /// False only when the executable could not be found.
    pub installed: bool,
    /// Detected only for agents that validate.
    pub version: Option<String>,
    pub valid: bool,
    pub error: Option<String>,
}

/// Thread-safe directory of agents keyed by name.
///
/// Registering a name that already exists replaces the previous agent.
/// Validation and version probes run on a snapshot, never under the lock.
#[derive(Default)]
pub struct Registry {
    agents: RwLock<HashMap<String, Arc<dyn Agent>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every shipped agent.
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        for agent in builtin::all() {
            registry.register(agent);
        }
        registry
    }

    pub fn register<A: Agent + 'static>(&self, agent: A) {
        self.register_shared(Arc::new(agent));
    }

    pub fn register_shared(&self, agent: Arc<dyn Agent>) {
        let name = agent.name().to_string();
        if self.write().insert(name.clone(), agent).is_some() {
            tracing::warn!(agent = %name, "replaced previously registered agent");
        } else {
            tracing::debug!(agent = %name, "registered agent");
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Agent>> {
        self.read().get(name).cloned()
    }

    /// Like [`get`](Self::get), but an unknown name is an error.
    pub fn require(&self, name: &str) -> Result<Arc<dyn Agent>> {
        self.get(name)
            .ok_or_else(|| AgentError::UnknownAgent(name.to_string()))
    }

    /// Registered names, sorted.
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Agents whose `validate()` currently succeeds, sorted by name.
    pub fn available(&self) -> Vec<Arc<dyn Agent>> {
        self.snapshot()
            .into_iter()
            .filter(|agent| agent.validate().is_ok())
            .collect()
    }

    /// Available agents that can run without a human at the keyboard.
    pub fn automatable(&self) -> Vec<Arc<dyn Agent>> {
        self.available()
            .into_iter()
            .filter(|agent| agent.capabilities().automatable)
            .collect()
    }

    /// Status of every registered agent, valid or not, sorted by name.
    pub fn doctor(&self) -> Vec<AgentStatus> {
        self.snapshot().iter().map(|agent| diagnose(agent.as_ref())).collect()
    }

    fn snapshot(&self) -> Vec<Arc<dyn Agent>> {
        let mut agents: Vec<Arc<dyn Agent>> = self.read().values().cloned().collect();
        agents.sort_by(|a, b| a.name().cmp(b.name()));
        agents
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Arc<dyn Agent>>> {
        self.agents.read().unwrap_or_else(|poison| poison.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Arc<dyn Agent>>> {
        self.agents.write().unwrap_or_else(|poison| poison.into_inner())
    }
}

fn diagnose(agent: &dyn Agent) -> AgentStatus {
    let name = agent.name().to_string();
    match agent.validate() {
        Ok(()) => {
            let version = match agent.version() {
                Ok(version) => Some(version),
                Err(e) => {
                    tracing::debug!(agent = %name, error = %e, "version probe failed");
                    None
                }
            };
            AgentStatus {
                name,
                installed: true,
                version,
                valid: true,
                error: None,
            }
        }
        Err(e) => AgentStatus {
            name,
            installed: !matches!(e, AgentError::NotInstalled { .. }),
            version: None,
            valid: false,
            error: Some(e.to_string()),
        },
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("agents", &self.list())
            .finish()
    }
}
