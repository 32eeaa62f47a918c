use cliagent::agent::{ExecOptions, Registry};
use cliagent::config::{Config, CONFIG_FILE};
use serial_test::serial;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

/// Points HOME at a fresh directory and clears CLIAGENT_* for the test's duration.
struct IsolatedEnv {
    home: TempDir,
    saved_home: Option<String>,
}

impl IsolatedEnv {
    fn new() -> Self {
        let home = TempDir::new().unwrap();
        let saved_home = std::env::var("HOME").ok();
        std::env::set_var("HOME", home.path());
        std::env::remove_var("CLIAGENT_AGENT");
        std::env::remove_var("CLIAGENT_TIMEOUT");
        Self { home, saved_home }
    }

    fn home(&self) -> &Path {
        self.home.path()
    }
}

impl Drop for IsolatedEnv {
    fn drop(&mut self) {
        match &self.saved_home {
            Some(home) => std::env::set_var("HOME", home),
            None => std::env::remove_var("HOME"),
        }
        std::env::remove_var("CLIAGENT_AGENT");
        std::env::remove_var("CLIAGENT_TIMEOUT");
    }
}

#[test]
#[serial]
fn test_load_without_files() {
    let _env = IsolatedEnv::new();
    let project = TempDir::new().unwrap();

    let config = Config::load(project.path()).unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(config.default_agent(), "claude");
}

#[test]
#[serial]
fn test_project_overrides_global() {
    let env = IsolatedEnv::new();
    let project = TempDir::new().unwrap();

    fs::write(
        env.home().join(CONFIG_FILE),
        r#"
        [defaults]
        agent = "codex"
        timeout_secs = 60
        autonomous = true

        [agents.helper]
        template = "global-helper {{PROMPT}}"
        "#,
    )
    .unwrap();
    fs::write(
        project.path().join(CONFIG_FILE),
        r#"
        [defaults]
        timeout_secs = 120

        [agents.helper]
        template = "project-helper {{PROMPT}}"
        "#,
    )
    .unwrap();

    let config = Config::load(project.path()).unwrap();
    assert_eq!(config.default_agent(), "codex");
    assert_eq!(config.defaults.timeout_secs, Some(120));

    let opts = config.exec_options();
    assert!(opts.autonomous);
    assert_eq!(opts.timeout, Some(Duration::from_secs(120)));

    let registry = Registry::with_builtins();
    config.register_custom_agents(&registry).unwrap();
    let helper = registry.get("helper").unwrap();
    let command = helper.build_command("go", &ExecOptions::default()).unwrap();
    assert_eq!(command.program, "project-helper");
}

#[test]
#[serial]
fn test_env_overrides_files() {
    let _env = IsolatedEnv::new();
    let project = TempDir::new().unwrap();
    fs::write(
        project.path().join(CONFIG_FILE),
        "[defaults]\nagent = \"codex\"\ntimeout_secs = 60\n",
    )
    .unwrap();

    std::env::set_var("CLIAGENT_AGENT", "gemini");
    std::env::set_var("CLIAGENT_TIMEOUT", "5");

    let config = Config::load(project.path()).unwrap();
    assert_eq!(config.default_agent(), "gemini");
    assert_eq!(config.exec_options().timeout, Some(Duration::from_secs(5)));
}

#[test]
#[serial]
fn test_invalid_env_timeout_ignored() {
    let _env = IsolatedEnv::new();
    let project = TempDir::new().unwrap();
    std::env::set_var("CLIAGENT_TIMEOUT", "soon");

    let config = Config::load(project.path()).unwrap();
    assert_eq!(config.defaults.timeout_secs, None);
}

#[test]
#[serial]
fn test_malformed_file_is_an_error() {
    let _env = IsolatedEnv::new();
    let project = TempDir::new().unwrap();
    fs::write(project.path().join(CONFIG_FILE), "[defaults\nagent = 1").unwrap();

    assert!(Config::load(project.path()).is_err());
}

#[test]
#[serial]
fn test_custom_command_tilde_expanded() {
    let env = IsolatedEnv::new();
    let config = Config::from_toml(
        r#"
        [agents.local]
        command = "~/bin/local-tool"
        args = ["{{PROMPT}}"]
        "#,
    )
    .unwrap();

    let registry = Registry::new();
    config.register_custom_agents(&registry).unwrap();
    let command = registry
        .get("local")
        .unwrap()
        .build_command("x", &ExecOptions::default())
        .unwrap();
    assert_eq!(
        Path::new(&command.program),
        env.home().join("bin/local-tool")
    );
}
