use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "cliagent")]
#[command(about = "Run command-line AI coding agents through one interface", long_about = None)]
#[command(version = env!("CLIAGENT_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Show debug logging on stderr
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    /// Project directory used for config lookup (defaults to the current directory)
    #[arg(short = 'C', long = "project-dir", global = true, value_name = "DIR")]
    pub project_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List registered agents
    List,

    /// Check which agents are installed and ready
    Doctor {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show an agent's capabilities
    Show {
        /// Agent name
        agent: String,
    },

    /// Run an agent with a prompt
    Run(RunArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// [AGENT] PROMPT: the agent is optional and defaults to the configured one
    #[arg(required = true, num_args = 1..=2, value_names = ["AGENT", "PROMPT"])]
    pub words: Vec<String>,

    /// Let the agent act without asking for confirmation
    #[arg(long)]
    pub autonomous: bool,

    /// Kill the agent after this many seconds (0 disables)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Working directory for the agent
    #[arg(long, value_name = "DIR")]
    pub workdir: Option<PathBuf>,

    /// Set environment variable (KEY=VALUE)
    #[arg(short = 'e', long = "env", value_name = "KEY=VALUE")]
    pub env: Vec<String>,

    /// Load environment variables from file
    #[arg(long = "env-file", value_name = "PATH")]
    pub env_file: Vec<PathBuf>,

    /// Named agent command, for agents that support one (e.g. opencode)
    #[arg(long = "command", value_name = "NAME")]
    pub command: Option<String>,

    /// Print the command instead of running it
    #[arg(long)]
    pub dry_run: bool,

    /// Extra arguments passed to the agent after `--`
    #[arg(last = true, value_name = "EXTRA")]
    pub extra: Vec<String>,
}

impl RunArgs {
    /// Agent named on the command line, if any.
    pub fn agent_name(&self) -> Option<&str> {
        match self.words.as_slice() {
            [agent, _prompt] => Some(agent),
            _ => None,
        }
    }

    pub fn prompt(&self) -> &str {
        self.words.last().map(String::as_str).unwrap_or_default()
    }
}
