pub mod doctor;
pub mod list;
pub mod run;
pub mod show;

use crate::agent::Registry;
use crate::config::Config;
use crate::error::Result;

/// Shipped agents plus the custom agents defined in `config`.
pub fn registry(config: &Config) -> Result<Registry> {
    let registry = Registry::with_builtins();
    config.register_custom_agents(&registry)?;
    Ok(registry)
}
