mod validate;

pub use validate::validate;

use config::{Config, File};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File consulted when no explicit path is given. Optional.
pub const DEFAULT_CONFIG_FILE: &str = "sdeck.toml";

/// Prefix of environment variable overrides, e.g. `SDECK__ELASTIC__DESIRED_COUNT`.
pub const ENV_PREFIX: &str = "SDECK";

/// Errors raised while loading or validating configuration.
#[sdeck_derive::stack_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },

    /// A value was read successfully but is not acceptable.
    #[error("Invalid configuration{}: {message}", format_context(.context))]
    Invalid { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

/// A reusable configuration loader that combines file-based settings with environment overrides.
///
/// This function implements a layered configuration strategy:
/// 1. **Base File**: Loads settings from a TOML file. With no path it looks for
///    [`DEFAULT_CONFIG_FILE`] and silently skips it when absent; an explicit path must exist.
/// 2. **Environment Overrides**: Overlays values from environment variables prefixed with `SDECK__`.
///    Nested structures are accessed using double underscores (e.g., `SDECK__NETWORK__CIDR` maps
///    to `network.cidr`).
///
/// # Errors
/// This function will return an error if:
/// * An explicitly given configuration file cannot be found or parsed.
/// * The merged content does not match the structure of type `T`.
///
/// # Example
/// ```rust
/// use sdeck_kernel::config::load_config;
///
/// #[derive(Default, serde::Deserialize)]
/// struct AppConfig {
///     port: u16,
/// }
///
/// let cfg: AppConfig = load_config(Some("config/local.toml")).unwrap_or_default();
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let (effective_path, required) = path.map_or_else(
        || (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        |p| (p.as_ref().to_path_buf(), true),
    );

    load_layered(effective_path.as_path(), required, env_overrides())
}

/// Environment source for `SDECK__` variables. Values are parsed, so numeric and boolean
/// overrides reach typed fields.
fn env_overrides() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .convert_case(config::Case::Snake)
        .try_parsing(true)
}

fn load_layered<T>(
    effective_path: &Path,
    required: bool,
    overrides: config::Environment,
) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let builder = Config::builder()
        .add_source(File::from(effective_path).required(required))
        .add_source(overrides);

    if required || effective_path.exists() {
        info!(path = %effective_path.display(), "Loading config");
    } else {
        debug!(path = %effective_path.display(), "No config file, using defaults and env overrides");
    }

    let config = builder
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdeck_domain::config::StackConfig;

    fn overrides(vars: &[(&str, &str)]) -> config::Environment {
        let map = vars.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
        env_overrides().source(Some(map))
    }

    fn load(vars: &[(&str, &str)]) -> Result<StackConfig, ConfigError> {
        load_layered(Path::new("absent-sdeck.toml"), false, overrides(vars))
    }

    #[test]
    fn numeric_env_overrides_reach_typed_fields() {
        let cfg = load(&[
            ("SDECK__ELASTIC__DESIRED_COUNT", "3"),
            ("SDECK__ELASTIC__MAX_COUNT", "6"),
            ("SDECK__SERVICE__ENABLE_CORS", "false"),
        ])
        .unwrap();
        assert_eq!(cfg.elastic.desired_count, 3);
        assert_eq!(cfg.elastic.max_count, 6);
        assert!(!cfg.service.enable_cors);
    }

    #[test]
    fn string_env_overrides_keep_their_text() {
        let cfg = load(&[("SDECK__NETWORK__CIDR", "10.8.0.0/16"), ("SDECK__STACK__NAME", "catalog")])
            .unwrap();
        assert_eq!(cfg.network.cidr, "10.8.0.0/16");
        assert_eq!(cfg.stack.name, "catalog");
    }

    #[test]
    fn unrelated_variables_are_ignored() {
        let cfg = load(&[("SDECK_ENV", "prod"), ("OTHER__ELASTIC__DESIRED_COUNT", "9")]).unwrap();
        assert_eq!(cfg.elastic.desired_count, 2);
    }
}
