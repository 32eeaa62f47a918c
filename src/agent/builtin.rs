//! The shipped agents.
//!
//! Each one is a capability descriptor over the shared [`CommandSynthesizer`];
//! none carries behavior of its own. To add a tool, add a constructor here and
//! list it in [`all`].

use super::capabilities::{Capabilities, PromptDelivery, PromptMethod};
use super::executor;
use super::options::{ExecOptions, ExecResult};
use super::synthesizer::{AgentCommand, CommandSynthesizer};
use super::Agent;
use crate::context::ExecContext;
use crate::error::{AgentError, Result};
use crate::utils::env;
use crate::version;
use std::path::PathBuf;
use std::time::Duration;

/// Upper bound for `<tool> --version`.
const VERSION_TIMEOUT: Duration = Duration::from_secs(5);

/// An agent defined entirely by its capability descriptor.
#[derive(Debug, Clone)]
pub struct BuiltinAgent {
    name: String,
    synthesizer: CommandSynthesizer,
}

impl BuiltinAgent {
    pub fn new(name: impl Into<String>, command: impl Into<String>, capabilities: Capabilities) -> Self {
        Self {
            name: name.into(),
            synthesizer: CommandSynthesizer::new(command, capabilities),
        }
    }

    /// Executable looked up on `PATH`.
    pub fn command(&self) -> &str {
        self.synthesizer.program()
    }
}

impl Agent for BuiltinAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> Result<String> {
        let command = AgentCommand::new(self.command(), vec!["--version".to_string()]);
        let opts = ExecOptions {
            timeout: Some(VERSION_TIMEOUT),
            ..Default::default()
        };
        let result = executor::run(&ExecContext::background(), &command, &opts)?;
        Ok(parse_version_output(&result))
    }

    fn validate(&self) -> Result<()> {
        require_executable(&self.name, self.command())?;
        require_env(&self.name, &self.capabilities().required_env)
    }

    fn capabilities(&self) -> &Capabilities {
        self.synthesizer.capabilities()
    }

    fn build_command(&self, prompt: &str, opts: &ExecOptions) -> Result<AgentCommand> {
        self.synthesizer.build(prompt, opts)
    }
}

fn parse_version_output(result: &ExecResult) -> String {
    version::extract_tool_version(&result.stdout)
        .or_else(|| version::extract_tool_version(&result.stderr))
        .unwrap_or_else(|| version::UNKNOWN.to_string())
}

/// Resolve `command` on `PATH` (or as a path), or report the agent as not installed.
pub(crate) fn require_executable(agent: &str, command: &str) -> Result<PathBuf> {
    which::which(command).map_err(|_| AgentError::NotInstalled {
        agent: agent.to_string(),
        command: command.to_string(),
    })
}

pub(crate) fn require_env(agent: &str, vars: &[String]) -> Result<()> {
    match vars.iter().find(|var| !env::is_set(var)) {
        Some(var) => Err(AgentError::MissingEnv {
            agent: agent.to_string(),
            var: var.clone(),
        }),
        None => Ok(()),
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

/// Anthropic's Claude Code: `claude -p <prompt>`.
pub fn claude() -> BuiltinAgent {
    let mut caps = Capabilities::new(PromptDelivery::new(PromptMethod::Arg {
        flag: "-p".to_string(),
    }));
    caps.autonomous_flag = "--dangerously-skip-permissions".to_string();
    caps.optional_env = strings(&["ANTHROPIC_API_KEY"]);
    caps.default_args = strings(&["--output-format", "text"]);
    BuiltinAgent::new("claude", "claude", caps)
}

/// Cline CLI: the task is a bare positional argument.
pub fn cline() -> BuiltinAgent {
    let mut caps = Capabilities::new(PromptDelivery::new(PromptMethod::Positional));
    caps.autonomous_flag = "--yolo".to_string();
    BuiltinAgent::new("cline", "cline", caps)
}

/// OpenAI Codex CLI: `codex exec <prompt>`. `exec` never prompts, so
/// autonomous mode adds nothing.
pub fn codex() -> BuiltinAgent {
    let mut caps = Capabilities::new(PromptDelivery::new(PromptMethod::Subcommand {
        subcommand: "exec".to_string(),
    }));
    caps.optional_env = strings(&["OPENAI_API_KEY"]);
    BuiltinAgent::new("codex", "codex", caps)
}

/// Google Gemini CLI: `gemini -p <prompt>`, `-i` for an interactive start.
pub fn gemini() -> BuiltinAgent {
    let mut caps = Capabilities::new(
        PromptDelivery::new(PromptMethod::Arg {
            flag: "-p".to_string(),
        })
        .with_interactive_flag("-i"),
    );
    caps.autonomous_flag = "--yolo".to_string();
    caps.optional_env = strings(&["GEMINI_API_KEY", "GOOGLE_API_KEY"]);
    BuiltinAgent::new("gemini", "gemini", caps)
}

/// Block's goose: `goose run -t <prompt>`.
pub fn goose() -> BuiltinAgent {
    let mut caps = Capabilities::new(PromptDelivery::new(PromptMethod::SubcommandArg {
        subcommand: "run".to_string(),
        prompt_flag: "-t".to_string(),
    }));
    caps.autonomous_flag = "--no-session".to_string();
    caps.autonomous_env.insert("GOOSE_MODE".to_string(), "auto".to_string());
    BuiltinAgent::new("goose", "goose", caps)
}

/// opencode: `opencode run <prompt> [--command <name>]`.
pub fn opencode() -> BuiltinAgent {
    let mut caps = Capabilities::new(PromptDelivery::new(PromptMethod::SubcommandWithFlag {
        subcommand: "run".to_string(),
        command_flag: "--command".to_string(),
    }));
    caps.autonomous_env.insert(
        "OPENCODE_PERMISSION".to_string(),
        r#"{"edit":"allow","bash":"allow","webfetch":"allow"}"#.to_string(),
    );
    BuiltinAgent::new("opencode", "opencode", caps)
}

/// Every shipped agent.
pub fn all() -> Vec<BuiltinAgent> {
    vec![claude(), cline(), codex(), gemini(), goose(), opencode()]
}
