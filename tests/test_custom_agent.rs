#![cfg(unix)]

use cliagent::agent::{Agent, CustomAgent, CustomAgentConfig, ExecOptions};
use cliagent::context::ExecContext;
use cliagent::error::AgentError;
use std::path::Path;
use std::process::Command;
use std::thread;
use std::time::{Duration, Instant};
use tempfile::TempDir;

fn agent(command: &str, args: &[&str], post_processor: Option<&str>) -> CustomAgent {
    CustomAgent::new(
        "test-agent",
        CustomAgentConfig {
            command: command.to_string(),
            args: args.iter().map(|arg| arg.to_string()).collect(),
            post_processor: post_processor.map(str::to_string),
            ..Default::default()
        },
    )
    .expect("valid custom agent")
}

fn background() -> ExecContext {
    ExecContext::background()
}

/// Run a script that records its pid in the file named by the prompt, then sleeps.
fn sleeper(post_processor: Option<&str>) -> CustomAgent {
    agent(
        "sh",
        &["-c", "echo $$ > \"$1\"; exec sleep 10", "sh", "{{PROMPT}}"],
        post_processor,
    )
}

fn is_running(pid: &str) -> bool {
    let signalable = Command::new("kill")
        .args(["-0", pid])
        .status()
        .unwrap()
        .success();
    // An unreaped orphan still answers kill -0; treat zombies as gone.
    let zombie = std::fs::read_to_string(format!("/proc/{}/stat", pid))
        .map(|stat| {
            stat.rsplit_once(')')
                .map(|(_, rest)| rest.trim_start().starts_with('Z'))
                .unwrap_or(false)
        })
        .unwrap_or(false);
    signalable && !zombie
}

fn assert_dead(pid_file: &Path) {
    let pid = std::fs::read_to_string(pid_file).expect("pid file written");
    let pid = pid.trim();

    let deadline = Instant::now() + Duration::from_secs(2);
    while is_running(pid) {
        assert!(Instant::now() < deadline, "process {} survived", pid);
        thread::sleep(Duration::from_millis(20));
    }
}

#[test]
fn test_echo_prompt() {
    let agent = agent("echo", &["{{PROMPT}}"], None);
    agent.validate().unwrap();

    let result = agent
        .execute(&background(), "hello", &ExecOptions::default())
        .unwrap();
    assert_eq!(result.exit_code, 0);
    assert_eq!(result.stdout, "hello\n");
    assert!(result.is_success());
}

#[test]
fn test_nonzero_exit_is_a_result() {
    let agent = agent("sh", &["-c", "echo oops >&2; exit 42", "{{PROMPT}}"], None);

    let result = agent
        .execute(&background(), "ignored", &ExecOptions::default())
        .unwrap();
    assert_eq!(result.exit_code, 42);
    assert_eq!(result.stderr, "oops\n");
    assert!(!result.is_success());
}

#[test]
fn test_post_processor_receives_literal_prompt() {
    let agent = agent("printf", &["%s", "{{PROMPT}}"], Some("cat"));
    agent.validate().unwrap();

    let prompt = "it's a \"test\" with $HOME, `id`, $(whoami)\nand a second line; exit 1 | rm -rf ~";
    let result = agent
        .execute(&background(), prompt, &ExecOptions::default())
        .unwrap();

    assert_eq!(result.exit_code, 0);
    assert_eq!(result.stdout, prompt);
}

#[test]
fn test_post_processor_transforms_output() {
    let agent = agent("printf", &["%s\\n", "{{PROMPT}}"], Some("tr a-z A-Z"));

    let result = agent
        .execute(&background(), "shout", &ExecOptions::default())
        .unwrap();
    assert_eq!(result.stdout, "SHOUT\n");
}

#[test]
fn test_env_overlay_reaches_process() {
    let mut config = CustomAgentConfig {
        command: "sh".to_string(),
        args: vec![
            "-c".to_string(),
            "printf '%s|%s' \"$MODE\" \"$EXTRA\"".to_string(),
            "{{PROMPT}}".to_string(),
        ],
        ..Default::default()
    };
    config.env.insert("MODE".to_string(), "batch".to_string());
    config.env.insert("EXTRA".to_string(), "config".to_string());
    let agent = CustomAgent::new("env-agent", config).unwrap();

    let mut opts = ExecOptions::default();
    opts.env.insert("EXTRA".to_string(), "call".to_string());

    let result = agent.execute(&background(), "x", &opts).unwrap();
    assert_eq!(result.stdout, "batch|call");
}

#[test]
fn test_work_dir() {
    let dir = TempDir::new().unwrap();
    let agent = agent("sh", &["-c", "pwd", "{{PROMPT}}"], None);

    let opts = ExecOptions {
        work_dir: Some(dir.path().to_path_buf()),
        ..Default::default()
    };
    let result = agent.execute(&background(), "x", &opts).unwrap();
    assert_eq!(
        Path::new(result.stdout.trim()).canonicalize().unwrap(),
        dir.path().canonicalize().unwrap()
    );
}

#[test]
fn test_timeout_kills_process() {
    let dir = TempDir::new().unwrap();
    let pid_file = dir.path().join("pid");
    let agent = sleeper(None);

    let opts = ExecOptions {
        timeout: Some(Duration::from_millis(300)),
        ..Default::default()
    };
    let start = Instant::now();
    let err = agent
        .execute(&background(), pid_file.to_str().unwrap(), &opts)
        .unwrap_err();

    assert!(matches!(err, AgentError::Timeout { .. }), "got {:?}", err);
    assert!(start.elapsed() < Duration::from_secs(5));
    assert_dead(&pid_file);
}

#[test]
fn test_timeout_kills_whole_pipeline() {
    let dir = TempDir::new().unwrap();
    let pid_file = dir.path().join("pid");
    let agent = sleeper(Some("cat"));

    let opts = ExecOptions {
        timeout: Some(Duration::from_millis(300)),
        ..Default::default()
    };
    let start = Instant::now();
    let err = agent
        .execute(&background(), pid_file.to_str().unwrap(), &opts)
        .unwrap_err();

    assert!(err.is_cancellation());
    assert!(start.elapsed() < Duration::from_secs(5));
    assert_dead(&pid_file);
}

#[test]
fn test_cancel_from_another_thread() {
    let dir = TempDir::new().unwrap();
    let pid_file = dir.path().join("pid");
    let agent = sleeper(None);

    let (ctx, cancel) = ExecContext::background().with_cancel();
    let canceller = thread::spawn(move || {
        thread::sleep(Duration::from_millis(200));
        cancel.cancel();
    });

    let start = Instant::now();
    let err = agent
        .execute(&ctx, pid_file.to_str().unwrap(), &ExecOptions::default())
        .unwrap_err();
    canceller.join().unwrap();

    assert!(matches!(err, AgentError::Cancelled), "got {:?}", err);
    assert!(start.elapsed() < Duration::from_secs(5));
    assert_dead(&pid_file);
}

#[test]
fn test_context_deadline_applies_without_option_timeout() {
    let agent = agent("sleep", &["{{PROMPT}}"], None);
    let ctx = ExecContext::background().with_timeout(Duration::from_millis(200));

    let err = agent
        .execute(&ctx, "10", &ExecOptions::default())
        .unwrap_err();
    assert!(matches!(err, AgentError::Timeout { .. }));
}

#[test]
fn test_missing_command_fails_validation_and_start() {
    let agent = agent("nonexistent_custom_tool_xyz", &["{{PROMPT}}"], None);
    assert!(agent.validate().unwrap_err().is_unavailable());

    let err = agent
        .execute(&background(), "x", &ExecOptions::default())
        .unwrap_err();
    assert!(matches!(err, AgentError::Spawn { .. }));
}
