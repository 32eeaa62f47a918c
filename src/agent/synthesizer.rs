//! Turns a capability descriptor, a prompt and per-call options into a command.
//!
//! Argument order is fixed: prompt delivery, default args, autonomous flag,
//! caller extra args. Environment layering is inherited < autonomous env <
//! caller env.

use super::capabilities::{Capabilities, PromptMethod};
use super::options::ExecOptions;
use crate::error::{AgentError, Result};
use crate::utils::shell;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::Command;

/// A fully resolved command line, ready to be started. Building one never
/// starts a process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentCommand {
    pub program: String,
    pub args: Vec<String>,
    /// Entries layered over the inherited environment.
    pub env: BTreeMap<String, String>,
    pub work_dir: Option<PathBuf>,
}

impl AgentCommand {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            env: BTreeMap::new(),
            work_dir: None,
        }
    }

    /// Quoted rendering, safe to paste into a POSIX shell.
    pub fn to_shell_string(&self) -> String {
        let mut parts: Vec<String> = self
            .env
            .iter()
            .map(|(key, value)| format!("{}={}", key, shell::escape(value)))
            .collect();
        parts.push(shell::escape(&self.program));
        parts.extend(self.args.iter().map(|arg| shell::escape(arg)));
        parts.join(" ")
    }

    pub(crate) fn to_process(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args).envs(&self.env);
        if let Some(dir) = &self.work_dir {
            command.current_dir(dir);
        }
        command
    }
}

/// Shared command-building strategy, parameterized by a descriptor.
#[derive(Debug, Clone)]
pub struct CommandSynthesizer {
    program: String,
    capabilities: Capabilities,
}

impl CommandSynthesizer {
    pub fn new(program: impl Into<String>, capabilities: Capabilities) -> Self {
        Self {
            program: program.into(),
            capabilities,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    pub fn build(&self, prompt: &str, opts: &ExecOptions) -> Result<AgentCommand> {
        let caps = &self.capabilities;
        let mut args = self.prompt_args(prompt)?;

        args.extend(caps.default_args.iter().cloned());

        if opts.autonomous && !caps.autonomous_flag.is_empty() {
            args.push(caps.autonomous_flag.clone());
        }

        args.extend(opts.extra_args.iter().cloned());

        let mut env = BTreeMap::new();
        if opts.autonomous {
            env.extend(caps.autonomous_env.clone());
        }
        env.extend(opts.env.clone());

        let command = AgentCommand {
            program: self.program.clone(),
            args,
            env,
            work_dir: opts.work_dir.clone().filter(|dir| !dir.as_os_str().is_empty()),
        };
        tracing::debug!(
            program = %command.program,
            method = caps.method().as_str(),
            autonomous = opts.autonomous,
            "synthesized agent command"
        );
        Ok(command)
    }

    fn prompt_args(&self, prompt: &str) -> Result<Vec<String>> {
        let mut args = Vec::new();
        match self.capabilities.method() {
            PromptMethod::Arg { flag } => {
                push_flag(&mut args, flag);
            }
            PromptMethod::Positional => {}
            PromptMethod::Subcommand { subcommand }
            | PromptMethod::SubcommandWithFlag { subcommand, .. } => {
                push_flag(&mut args, subcommand);
            }
            PromptMethod::SubcommandArg {
                subcommand,
                prompt_flag,
            } => {
                push_flag(&mut args, subcommand);
                push_flag(&mut args, prompt_flag);
            }
            PromptMethod::Template => {
                return Err(AgentError::InvalidConfig(format!(
                    "'{}' uses template prompt delivery, which only custom agents can build",
                    self.program
                )));
            }
        }
        args.push(prompt.to_string());
        Ok(args)
    }
}

/// Unset descriptor fields are a no-op.
fn push_flag(args: &mut Vec<String>, flag: &str) {
    if !flag.is_empty() {
        args.push(flag.to_string());
    }
}
