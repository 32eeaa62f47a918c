//! Agents defined at runtime from a user command template.
//!
//! ```
//! use cliagent::agent::{Agent, CustomAgent, ExecOptions};
//!
//! let agent = CustomAgent::from_template("quick", "my-tool run {{PROMPT}}")?;
//! let command = agent.build_command("add tests", &ExecOptions::default())?;
//! assert_eq!(command.program, "my-tool");
//! assert_eq!(command.args, vec!["run", "add tests"]);
//! # Ok::<(), cliagent::error::AgentError>(())
//! ```

use super::builtin::{require_executable, require_env};
use super::capabilities::{Capabilities, PromptDelivery, PromptMethod};
use super::options::ExecOptions;
use super::synthesizer::AgentCommand;
use super::{is_valid_name, Agent};
use crate::error::{AgentError, Result};
use crate::utils::shell;
use crate::version;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Token replaced by the prompt in every template argument.
pub const PROMPT_PLACEHOLDER: &str = "{{PROMPT}}";

/// Shell used to run a post-processor pipeline.
const PIPE_SHELL: &str = "sh";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomAgentConfig {
    pub command: String,
    /// Must contain [`PROMPT_PLACEHOLDER`] at least once.
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
    /// Shell filter the agent's stdout is piped through, e.g. `jq -r .result`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_processor: Option<String>,
}

impl CustomAgentConfig {
    /// Split a one-line template on whitespace: first word is the command.
    pub fn from_template(template: &str) -> Self {
        let mut words = template.split_whitespace().map(str::to_string);
        Self {
            command: words.next().unwrap_or_default(),
            args: words.collect(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct CustomAgent {
    name: String,
    config: CustomAgentConfig,
    capabilities: Capabilities,
}

impl CustomAgent {
    /// Fails when the name is malformed, the command is empty, or no
    /// argument carries the prompt placeholder.
    pub fn new(name: impl Into<String>, mut config: CustomAgentConfig) -> Result<Self> {
        let name = name.into();
        if !is_valid_name(&name) {
            return Err(AgentError::InvalidConfig(format!(
                "Invalid agent name '{}': use lowercase letters, digits, '-' or '_'",
                name
            )));
        }
        if config.command.trim().is_empty() {
            return Err(AgentError::InvalidConfig(format!(
                "Custom agent '{}' has an empty command",
                name
            )));
        }
        if !config.args.iter().any(|arg| arg.contains(PROMPT_PLACEHOLDER)) {
            return Err(AgentError::InvalidConfig(format!(
                "Custom agent '{}' must pass {} in its arguments",
                name, PROMPT_PLACEHOLDER
            )));
        }
        config.post_processor = config
            .post_processor
            .take()
            .map(|filter| filter.trim().to_string())
            .filter(|filter| !filter.is_empty());

        Ok(Self {
            name,
            config,
            capabilities: Capabilities::new(PromptDelivery::new(PromptMethod::Template)),
        })
    }

    pub fn from_template(name: impl Into<String>, template: &str) -> Result<Self> {
        Self::new(name, CustomAgentConfig::from_template(template))
    }

    pub fn config(&self) -> &CustomAgentConfig {
        &self.config
    }

    fn render_args(&self, prompt: &str, opts: &ExecOptions) -> Vec<String> {
        let mut argv = Vec::with_capacity(self.config.args.len() + opts.extra_args.len());
        argv.extend(
            self.config
                .args
                .iter()
                .map(|arg| arg.replace(PROMPT_PLACEHOLDER, prompt)),
        );
        argv.extend(opts.extra_args.iter().cloned());
        argv
    }
}

impl Agent for CustomAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> Result<String> {
        Ok(version::UNKNOWN.to_string())
    }

    fn validate(&self) -> Result<()> {
        require_executable(&self.name, &self.config.command)?;
        if let Some(filter) = &self.config.post_processor {
            let program = filter.split_whitespace().next().unwrap_or_default();
            require_executable(&self.name, program)?;
        }
        require_env(&self.name, &self.capabilities.required_env)
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    fn build_command(&self, prompt: &str, opts: &ExecOptions) -> Result<AgentCommand> {
        let args = self.render_args(prompt, opts);

        let mut command = match &self.config.post_processor {
            None => AgentCommand::new(self.config.command.clone(), args),
            Some(filter) => {
                let mut argv = Vec::with_capacity(args.len() + 1);
                argv.push(self.config.command.clone());
                argv.extend(args);
                let script = shell::pipeline(&argv, filter);
                AgentCommand::new(PIPE_SHELL, vec!["-c".to_string(), script])
            }
        };

        command.env = self.config.env.clone();
        command.env.extend(opts.env.clone());
        command.work_dir = opts
            .work_dir
            .clone()
            .filter(|dir| !dir.as_os_str().is_empty());

        tracing::debug!(
            agent = %self.name,
            program = %command.program,
            piped = self.config.post_processor.is_some(),
            "built custom agent command"
        );
        Ok(command)
    }
}
