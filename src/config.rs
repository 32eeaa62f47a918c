use crate::agent::{CustomAgent, CustomAgentConfig, ExecOptions, Registry};
use crate::cli::RunArgs;
use crate::error::{AgentError, Result};
use crate::utils::path::{expand_tilde, home_dir};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// File name looked up in the home directory and the project root.
pub const CONFIG_FILE: &str = ".cliagent.toml";

/// Agent used by `run` when neither configuration nor the caller names one.
pub const DEFAULT_AGENT: &str = "claude";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Custom agents keyed by name.
    #[serde(default)]
    pub agents: BTreeMap<String, AgentEntry>,
}

/// Unset fields fall through to the next lower layer.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DefaultsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,

    /// Seconds; 0 disables the timeout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autonomous: Option<bool>,
}

/// One `[agents.<name>]` table: either a `template` line or `command` + `args`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AgentEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_processor: Option<String>,
}

impl AgentEntry {
    /// Build the custom agent this entry describes.
    pub fn to_agent(&self, name: &str) -> Result<CustomAgent> {
        let mut config = match (&self.template, &self.command) {
            (Some(_), Some(_)) => {
                return Err(AgentError::InvalidConfig(
                    "set either 'template' or 'command', not both".to_string(),
                ));
            }
            (Some(_), None) if !self.args.is_empty() => {
                return Err(AgentError::InvalidConfig(
                    "'args' cannot be combined with 'template'".to_string(),
                ));
            }
            (Some(template), None) => CustomAgentConfig::from_template(template),
            (None, Some(command)) => CustomAgentConfig {
                command: command.clone(),
                args: self.args.clone(),
                ..Default::default()
            },
            (None, None) => {
                return Err(AgentError::InvalidConfig(
                    "missing 'template' or 'command'".to_string(),
                ));
            }
        };

        if let Some(expanded) = expand_tilde(&config.command) {
            config.command = expanded.to_string_lossy().into_owned();
        }
        config.env = self.env.clone();
        config.post_processor = self.post_processor.clone();

        CustomAgent::new(name, config)
    }
}

impl Config {
    /// Load configuration with precedence:
    /// 1. CLI flags (applied later via with_cli_overrides)
    /// 2. Environment variables (`CLIAGENT_AGENT`, `CLIAGENT_TIMEOUT`)
    /// 3. Project config (.cliagent.toml in project root)
    /// 4. Global config (~/.cliagent.toml)
    /// 5. Built-in defaults
    pub fn load(project_root: &Path) -> Result<Self> {
        let mut config = Self::default();

        if let Some(home) = home_dir() {
            let global_config = home.join(CONFIG_FILE);
            if global_config.exists() {
                config = config.merge(Self::from_file(&global_config)?);
            }
        }

        let project_config = project_root.join(CONFIG_FILE);
        if project_config.exists() {
            config = config.merge(Self::from_file(&project_config)?);
        }

        Ok(config.merge_env())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "loading config");
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Merge another config into this one (other takes precedence).
    fn merge(mut self, other: Self) -> Self {
        if other.defaults.agent.is_some() {
            self.defaults.agent = other.defaults.agent;
        }
        if other.defaults.timeout_secs.is_some() {
            self.defaults.timeout_secs = other.defaults.timeout_secs;
        }
        if other.defaults.autonomous.is_some() {
            self.defaults.autonomous = other.defaults.autonomous;
        }

        // Whole entries replace same-named ones
        self.agents.extend(other.agents);

        self
    }

    fn merge_env(mut self) -> Self {
        if let Ok(agent) = std::env::var("CLIAGENT_AGENT") {
            if !agent.is_empty() {
                self.defaults.agent = Some(agent);
            }
        }

        if let Ok(timeout) = std::env::var("CLIAGENT_TIMEOUT") {
            match timeout.parse::<u64>() {
                Ok(secs) => self.defaults.timeout_secs = Some(secs),
                Err(_) => tracing::warn!(value = %timeout, "ignoring invalid CLIAGENT_TIMEOUT"),
            }
        }

        self
    }

    /// Apply `run` flags (highest precedence).
    pub fn with_cli_overrides(mut self, run: &RunArgs) -> Self {
        if let Some(agent) = run.agent_name() {
            self.defaults.agent = Some(agent.to_string());
        }
        if let Some(timeout) = run.timeout {
            self.defaults.timeout_secs = Some(timeout);
        }
        if run.autonomous {
            self.defaults.autonomous = Some(true);
        }
        self
    }

    pub fn default_agent(&self) -> &str {
        self.defaults.agent.as_deref().unwrap_or(DEFAULT_AGENT)
    }

    /// Base options for a run; callers overlay per-call fields.
    pub fn exec_options(&self) -> ExecOptions {
        ExecOptions {
            autonomous: self.defaults.autonomous.unwrap_or(false),
            timeout: self
                .defaults
                .timeout_secs
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
            ..Default::default()
        }
    }

    /// Build every `[agents.*]` entry and register it. An entry named like a
    /// built-in replaces it.
    pub fn register_custom_agents(&self, registry: &Registry) -> Result<()> {
        for (name, entry) in &self.agents {
            let agent = entry.to_agent(name).map_err(|e| match e {
                AgentError::InvalidConfig(msg) => {
                    AgentError::InvalidConfig(format!("[agents.{}] {}", name, msg))
                }
                other => other,
            })?;
            registry.register(agent);
        }
        Ok(())
    }

    /// Config files that `load` would read for `project_root`, existing or not.
    pub fn search_paths(project_root: &Path) -> Vec<PathBuf> {
        home_dir()
            .map(|home| home.join(CONFIG_FILE))
            .into_iter()
            .chain(std::iter::once(project_root.join(CONFIG_FILE)))
            .collect()
    }
}
