use crate::agent::{Agent, ExecOptions, OutputSink, Registry};
use crate::cli::RunArgs;
use crate::config::Config;
use crate::context::ExecContext;
use crate::error::{AgentError, Result};
use crate::utils::env;
use crate::utils::path::expand_tilde;
use std::path::{Path, PathBuf};

/// Run the selected agent and return its exit code.
///
/// `config` must already carry the `run` overrides, so its default agent is
/// the one to start.
pub fn execute(config: &Config, registry: &Registry, run: &RunArgs) -> Result<i32> {
    let agent = registry.require(config.default_agent())?;
    let mut opts = build_options(config, agent.as_ref(), run)?;

    if run.dry_run {
        let command = agent.build_command(run.prompt(), &opts)?;
        println!("{}", command.to_shell_string());
        return Ok(0);
    }

    agent.validate()?;

    opts.stdout = Some(OutputSink::stdout());
    opts.stderr = Some(OutputSink::stderr());

    let (ctx, cancel) = ExecContext::background().with_cancel();
    if let Err(e) = ctrlc::set_handler(move || cancel.cancel()) {
        tracing::warn!(error = %e, "could not install interrupt handler");
    }

    let result = agent.execute(&ctx, run.prompt(), &opts)?;
    tracing::debug!(
        agent = agent.name(),
        exit_code = result.exit_code,
        duration_ms = result.duration.as_millis() as u64,
        "agent finished"
    );
    Ok(result.exit_code)
}

/// Config defaults, then env files, then `-e` pairs, then named command and
/// extra args.
pub fn build_options(config: &Config, agent: &dyn Agent, run: &RunArgs) -> Result<ExecOptions> {
    let mut opts = config.exec_options();

    opts.work_dir = run.workdir.as_deref().map(expand);

    for file in &run.env_file {
        opts.env.extend(env::load_env_file(&expand(file))?);
    }
    opts.env.extend(env::parse_env_args(&run.env)?);

    if let Some(name) = &run.command {
        let args = agent.capabilities().command_args(name).ok_or_else(|| {
            AgentError::InvalidConfig(format!(
                "Agent '{}' does not support --command",
                agent.name()
            ))
        })?;
        opts.extra_args.extend(args);
    }
    opts.extra_args.extend(run.extra.iter().cloned());

    Ok(opts)
}

fn expand(path: &Path) -> PathBuf {
    expand_tilde(path).unwrap_or_else(|| path.to_path_buf())
}
