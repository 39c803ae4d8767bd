pub mod outputs;
pub mod plan;
pub mod synth;

use anyhow::Result;
use sdeck::domain::Environment;
use sdeck::domain::config::StackConfig;
use sdeck::kernel::config::load_config;
use sdeck::{Stack, StackError, SynthesizedStack, parse_environment};
use std::path::Path;

/// Resolves the `--env` / `SDECK_ENV` value. A missing value is a configuration error like
/// an invalid one.
pub fn environment(raw: Option<&str>) -> Result<Environment, StackError> {
    raw.map_or_else(
        || {
            Err(StackError::InvalidEnvironment {
                message: "pass --env or set SDECK_ENV".into(),
                context: None,
            })
        },
        parse_environment,
    )
}

/// Loads configuration, validates it for `environment` and synthesizes the stack.
pub fn synthesize(environment: Environment, path: Option<&Path>) -> Result<SynthesizedStack> {
    let config: StackConfig = load_config(path).map_err(StackError::from)?;
    let stack = Stack::new(config, environment)?;
    Ok(stack.synthesize()?)
}
