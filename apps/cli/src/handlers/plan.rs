use anyhow::Result;
use sdeck::domain::Environment;
use std::path::Path;

/// Prints the plan summary of the synthesized stack.
///
/// # Errors
/// Returns an error if configuration or provisioning fails.
pub fn run(environment: Environment, config: Option<&Path>, json: bool) -> Result<()> {
    let plan = super::synthesize(environment, config)?.plan();

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        println!("{plan}");
    }
    Ok(())
}
