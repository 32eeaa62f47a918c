use crate::agent::Registry;
use crate::error::Result;

pub fn execute(registry: &Registry, name: &str) -> Result<()> {
    let agent = registry.require(name)?;
    let report = serde_json::json!({
        "name": agent.name(),
        "capabilities": agent.capabilities(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
