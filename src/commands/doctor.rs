use crate::agent::{AgentStatus, Registry};
use crate::error::Result;

pub fn execute(registry: &Registry, json: bool) -> Result<()> {
    let statuses = registry.doctor();

    if json {
        println!("{}", serde_json::to_string_pretty(&statuses)?);
        return Ok(());
    }

    print!("{}", render_table(&statuses));

    let ready = statuses.iter().filter(|status| status.valid).count();
    println!("\n{} of {} agents ready", ready, statuses.len());
    Ok(())
}

fn render_table(statuses: &[AgentStatus]) -> String {
    let mut out = format!(
        "{:<12} {:<10} {:<6} {:<14} {}\n",
        "AGENT", "INSTALLED", "VALID", "VERSION", "ERROR"
    );
    for status in statuses {
        out.push_str(&format!(
            "{:<12} {:<10} {:<6} {:<14} {}\n",
            status.name,
            mark(status.installed),
            mark(status.valid),
            status.version.as_deref().unwrap_or("-"),
            status.error.as_deref().unwrap_or("")
        ));
    }
    out
}

fn mark(ok: bool) -> &'static str {
    if ok {
        "✓"
    } else {
        "✗"
    }
}
