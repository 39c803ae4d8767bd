use anyhow::{Context, Result};
use sdeck::domain::Environment;
use std::fs;
use std::path::Path;
use tracing::info;

/// Synthesizes the template and prints it, or writes it to `out`.
///
/// # Errors
/// Returns an error if configuration, provisioning or writing the file fails.
pub fn run(environment: Environment, config: Option<&Path>, out: Option<&Path>) -> Result<()> {
    let stack = super::synthesize(environment, config)?;
    let template = stack.to_json_pretty()?;

    match out {
        Some(path) => {
            fs::write(path, format!("{template}\n"))
                .with_context(|| format!("Failed to write template to {}", path.display()))?;
            info!(path = %path.display(), resources = stack.graph.len(), "Template written");
        },
        None => println!("{template}"),
    }
    Ok(())
}
