//! Uniform execution layer for command-line AI coding agents.
//!
//! Every external tool is wrapped behind the [`Agent`] trait, so callers can
//! look an agent up by name, check that it is runnable and hand it a prompt
//! without knowing the tool's argument conventions.
//!
//! # Architecture
//!
//! - **Capabilities**: immutable descriptor of how a tool takes a prompt and
//!   enters autonomous mode
//! - **Synthesizer**: shared strategy turning a descriptor, a prompt and
//!   options into an [`AgentCommand`]
//! - **Executor**: starts the command under a cancellable, time-bounded context
//! - **Builtin**: the shipped agents, pure data over the synthesizer
//! - **Custom**: agents defined from a user command template
//! - **Registry**: thread-safe directory of agents
//!
//! # Example
//!
//! ```no_run
//! use cliagent::agent::{ExecOptions, Registry};
//! use cliagent::context::ExecContext;
//!
//! let registry = Registry::with_builtins();
//! let agent = registry.get("claude").expect("claude is built in");
//! agent.validate()?;
//!
//! let opts = ExecOptions { autonomous: true, ..Default::default() };
//! let result = agent.execute(&ExecContext::background(), "add a changelog entry", &opts)?;
//! println!("exit code {}", result.exit_code);
//! # Ok::<(), cliagent::error::AgentError>(())
//! ```

pub mod builtin;
pub mod capabilities;
pub mod custom;
pub mod executor;
pub mod options;
pub mod registry;
pub mod synthesizer;

pub use builtin::BuiltinAgent;
pub use capabilities::{Capabilities, PromptDelivery, PromptMethod};
pub use custom::{CustomAgent, CustomAgentConfig, PROMPT_PLACEHOLDER};
pub use options::{ExecOptions, ExecResult, OutputSink};
pub use registry::{AgentStatus, Registry};
pub use synthesizer::{AgentCommand, CommandSynthesizer};

use crate::context::ExecContext;
use crate::error::Result;
use std::path::{Path, PathBuf};

/// One external CLI tool behind a uniform contract.
pub trait Agent: Send + Sync {
    /// Stable lowercase identifier, used as the registry key.
    fn name(&self) -> &str;

    /// Best-effort tool version; `"unknown"` when it cannot be detected.
    fn version(&self) -> Result<String>;

    /// Cheap runnability check: executable on `PATH` and required env set.
    /// Never starts the tool.
    fn validate(&self) -> Result<()>;

    fn capabilities(&self) -> &Capabilities;

    /// Build the command for `prompt` without starting anything.
    fn build_command(&self, prompt: &str, opts: &ExecOptions) -> Result<AgentCommand>;

    /// Build, then run the command under `ctx`.
    fn execute(&self, ctx: &ExecContext, prompt: &str, opts: &ExecOptions) -> Result<ExecResult> {
        let command = self.build_command(prompt, opts)?;
        executor::run(ctx, &command, opts)
    }

    fn as_configurator(&self) -> Option<&dyn Configurator> {
        None
    }

    fn as_sandbox_configurator(&self) -> Option<&dyn SandboxConfigurator> {
        None
    }
}

/// Outcome of a project or sandbox configuration step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigureResult {
    /// File that was written, if any.
    pub config_path: Option<PathBuf>,
    /// Permission entries that were added.
    pub added: Vec<String>,
    /// True when the configuration was already in place.
    pub already_configured: bool,
    pub warning: Option<String>,
}

/// Agents that can prepare a project's tool-specific settings.
pub trait Configurator {
    fn configure_project(&self, project_dir: &Path, specs_dir: &Path) -> Result<ConfigureResult>;
}

/// Agents that run inside a filesystem sandbox needing extra writable paths.
pub trait SandboxConfigurator {
    fn sandbox_paths(&self, project_dir: &Path, specs_dir: &Path) -> Vec<PathBuf>;

    fn configure_sandbox(&self, project_dir: &Path, specs_dir: &Path) -> Result<ConfigureResult>;
}

/// Agent names are lowercase ASCII alphanumerics, with `-` or `_` inside.
pub fn is_valid_name(name: &str) -> bool {
    let bytes = name.as_bytes();
    match (bytes.first(), bytes.last()) {
        (Some(first), Some(last)) if first.is_ascii_alphanumeric() && last.is_ascii_alphanumeric() => {
            name.chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
        }
        _ => false,
    }
}
