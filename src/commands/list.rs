use crate::agent::Registry;
use crate::error::Result;

pub fn execute(registry: &Registry) -> Result<()> {
    for name in registry.list() {
        println!("{}", name);
    }
    Ok(())
}
