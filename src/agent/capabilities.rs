//! Capability descriptors: how an agent accepts a prompt and enters autonomous mode.
//!
//! These types are plain data. Each [`PromptMethod`] variant carries exactly
//! the fields it needs, so a descriptor cannot populate a flag that its
//! delivery method would never consult.

use serde::Serialize;
use std::collections::BTreeMap;

/// How the prompt is placed on the command line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum PromptMethod {
    /// `<flag> <prompt>`, e.g. `claude -p "..."`.
    Arg { flag: String },
    /// `<prompt>` as a bare positional argument.
    Positional,
    /// `<subcommand> <prompt>`, e.g. `codex exec "..."`.
    Subcommand { subcommand: String },
    /// `<subcommand> <prompt_flag> <prompt>`, e.g. `goose run -t "..."`.
    SubcommandArg {
        subcommand: String,
        prompt_flag: String,
    },
    /// `<subcommand> <prompt>`; callers append `<command_flag> <name>` through
    /// extra args (see [`Capabilities::command_args`]).
    SubcommandWithFlag {
        subcommand: String,
        command_flag: String,
    },
    /// The agent builds its own argv from a user template.
    Template,
}

impl PromptMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PromptMethod::Arg { .. } => "arg",
            PromptMethod::Positional => "positional",
            PromptMethod::Subcommand { .. } => "subcommand",
            PromptMethod::SubcommandArg { .. } => "subcommand_arg",
            PromptMethod::SubcommandWithFlag { .. } => "subcommand_with_flag",
            PromptMethod::Template => "template",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptDelivery {
    #[serde(flatten)]
    pub method: PromptMethod,

    /// Flag that starts the tool interactively with an initial prompt.
    /// Informational only: interactive execution is not driven by this crate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interactive_flag: Option<String>,
}

impl PromptDelivery {
    pub fn new(method: PromptMethod) -> Self {
        Self {
            method,
            interactive_flag: None,
        }
    }

    pub fn with_interactive_flag(mut self, flag: impl Into<String>) -> Self {
        self.interactive_flag = Some(flag.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    /// Whether the agent can run headless from a single prompt.
    pub automatable: bool,

    pub prompt_delivery: PromptDelivery,

    /// Appended once when autonomous mode is requested. Empty means the
    /// tool is already non-interactive in the delivered form.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub autonomous_flag: String,

    /// Injected into the process environment in autonomous mode.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub autonomous_env: BTreeMap<String, String>,

    /// Must be set and non-empty for `validate()` to pass.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required_env: Vec<String>,

    /// Consulted by the tool when present; never checked.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub optional_env: Vec<String>,

    /// Always emitted right after the prompt arguments.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub default_args: Vec<String>,
}

impl Capabilities {
    pub fn new(prompt_delivery: PromptDelivery) -> Self {
        Self {
            automatable: true,
            prompt_delivery,
            autonomous_flag: String::new(),
            autonomous_env: BTreeMap::new(),
            required_env: Vec::new(),
            optional_env: Vec::new(),
            default_args: Vec::new(),
        }
    }

    pub fn method(&self) -> &PromptMethod {
        &self.prompt_delivery.method
    }

    /// Extra args that select a named command for `SubcommandWithFlag` tools.
    ///
    /// ```
    /// use cliagent::agent::{builtin, Agent};
    ///
    /// let opencode = builtin::opencode();
    /// assert_eq!(
    ///     opencode.capabilities().command_args("review"),
    ///     Some(vec!["--command".to_string(), "review".to_string()])
    /// );
    /// ```
    pub fn command_args(&self, name: &str) -> Option<Vec<String>> {
        match self.method() {
            PromptMethod::SubcommandWithFlag { command_flag, .. } if !command_flag.is_empty() => {
                Some(vec![command_flag.clone(), name.to_string()])
            }
            _ => None,
        }
    }
}
