use cliagent::agent::{
    Agent, AgentCommand, Capabilities, ExecOptions, PromptDelivery, PromptMethod, Registry,
};
use cliagent::error::{AgentError, Result};
use std::sync::Arc;
use std::thread;

struct StubAgent {
    name: String,
    valid: bool,
    caps: Capabilities,
}

impl StubAgent {
    fn new(name: &str, valid: bool, automatable: bool) -> Self {
        let mut caps = Capabilities::new(PromptDelivery::new(PromptMethod::Positional));
        caps.automatable = automatable;
        Self {
            name: name.to_string(),
            valid,
            caps,
        }
    }
}

impl Agent for StubAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> Result<String> {
        Ok("0.0.1".to_string())
    }

    fn validate(&self) -> Result<()> {
        if self.valid {
            Ok(())
        } else {
            Err(AgentError::NotInstalled {
                agent: self.name.clone(),
                command: self.name.clone(),
            })
        }
    }

    fn capabilities(&self) -> &Capabilities {
        &self.caps
    }

    fn build_command(&self, prompt: &str, _opts: &ExecOptions) -> Result<AgentCommand> {
        Ok(AgentCommand::new(self.name.clone(), vec![prompt.to_string()]))
    }
}

fn names(agents: &[Arc<dyn Agent>]) -> Vec<String> {
    agents.iter().map(|agent| agent.name().to_string()).collect()
}

#[test]
fn test_available_and_automatable_filtering() {
    let registry = Registry::new();
    // Registered out of order: results must come back sorted.
    registry.register(StubAgent::new("delta", false, false));
    registry.register(StubAgent::new("alpha", true, true));
    registry.register(StubAgent::new("charlie", true, false));
    registry.register(StubAgent::new("bravo", false, true));
    registry.register(StubAgent::new("echo", true, true));

    assert_eq!(
        registry.list(),
        vec!["alpha", "bravo", "charlie", "delta", "echo"]
    );
    assert_eq!(
        names(&registry.available()),
        vec!["alpha", "charlie", "echo"]
    );
    assert_eq!(names(&registry.automatable()), vec!["alpha", "echo"]);
}

#[test]
fn test_doctor_covers_invalid_agents() {
    let registry = Registry::new();
    registry.register(StubAgent::new("ok", true, true));
    registry.register(StubAgent::new("broken", false, true));

    let statuses = registry.doctor();
    assert_eq!(statuses.len(), 2);
    assert_eq!(statuses[0].name, "broken");
    assert!(!statuses[0].valid);
    assert!(statuses[0].version.is_none());
    assert_eq!(statuses[1].name, "ok");
    assert_eq!(statuses[1].version.as_deref(), Some("0.0.1"));
}

#[test]
fn test_concurrent_register_get_list() {
    let registry = Arc::new(Registry::new());
    let mut handles = Vec::new();

    for i in 0..100 {
        let writer = Arc::clone(&registry);
        handles.push(thread::spawn(move || {
            writer.register(StubAgent::new(&format!("agent-{}", i), i % 2 == 0, true));
        }));

        let reader = Arc::clone(&registry);
        handles.push(thread::spawn(move || {
            if let Some(agent) = reader.get(&format!("agent-{}", i)) {
                assert_eq!(agent.name(), format!("agent-{}", i));
            }
        }));

        let lister = Arc::clone(&registry);
        handles.push(thread::spawn(move || {
            let names = lister.list();
            let mut sorted = names.clone();
            sorted.sort();
            assert_eq!(names, sorted);
        }));
    }

    for handle in handles {
        handle.join().expect("registry thread panicked");
    }

    let names = registry.list();
    assert_eq!(names.len(), 100);
    for i in 0..100 {
        assert!(registry.get(&format!("agent-{}", i)).is_some());
    }
    assert_eq!(registry.available().len(), 50);
}

#[test]
fn test_reregistration_last_write_wins() {
    let registry = Registry::new();
    registry.register(StubAgent::new("same", false, true));
    registry.register(StubAgent::new("same", true, true));

    assert_eq!(registry.list(), vec!["same"]);
    assert_eq!(registry.available().len(), 1);
}

#[test]
fn test_builtins_registered() {
    let registry = Registry::with_builtins();
    for name in ["claude", "cline", "codex", "gemini", "goose", "opencode"] {
        let agent = registry.get(name).expect("built-in agent missing");
        assert_eq!(agent.name(), name);
        assert!(agent.capabilities().automatable);
    }
}
