use super::ConfigError;
use sdeck_domain::Environment;
use sdeck_domain::config::{
    ElasticConfig, HealthCheckConfig, LogRetentionConfig, StackConfig, StackSection,
};
use std::borrow::Cow;

/// Retention periods accepted by the log service, in days.
const RETENTION_DAYS: &[u32] = &[
    1, 3, 5, 7, 14, 30, 60, 90, 120, 150, 180, 365, 400, 545, 731, 1096, 1827, 2192, 2557, 2922,
    3288, 3653,
];

/// Task sizes accepted by the elastic compute service: cpu units and the memory range in MiB.
const TASK_SIZES: &[(u32, u32, u32)] = &[
    (256, 512, 2048),
    (512, 1024, 4096),
    (1024, 2048, 8192),
    (2048, 4096, 16384),
    (4096, 8192, 30720),
];

const MAX_STACK_NAME_LEN: usize = 32;
const MAX_AZS: u8 = 4;

/// Bounds of the generated credential, in hex characters.
const KEY_LENGTHS: std::ops::RangeInclusive<u32> = 32..=256;

/// Checks a loaded configuration for the given environment.
///
/// Runs before anything is added to a graph, so a rejected value never leaves a partial result.
/// The network address block is checked when the network plan is computed.
///
/// # Errors
/// Returns [`ConfigError::Invalid`] naming the first offending key.
pub fn validate(config: &StackConfig, environment: Environment) -> Result<(), ConfigError> {
    stack_name(&config.stack)?;

    if config.network.max_azs == 0 || config.network.max_azs > MAX_AZS {
        return Err(invalid(
            "network.max_azs",
            format!("must be between 1 and {MAX_AZS}, got {}", config.network.max_azs),
        ));
    }
    if environment.is_production() && config.network.max_azs < 2 {
        return Err(invalid("network.max_azs", "the load balancer needs at least 2 zones"));
    }

    if config.service.image.trim().is_empty() {
        return Err(invalid("service.image", "must not be empty"));
    }
    if !config.service.data_dir.starts_with('/') {
        return Err(invalid("service.data_dir", "must be an absolute path"));
    }

    if config.persistent.instance_class.trim().is_empty() {
        return Err(invalid("persistent.instance_class", "must not be empty"));
    }
    if config.persistent.memory_reservation_mib == 0 {
        return Err(invalid("persistent.memory_reservation_mib", "must be positive"));
    }
    if !config.persistent.host_data_path.starts_with('/') {
        return Err(invalid("persistent.host_data_path", "must be an absolute path"));
    }

    let key_length = config.secrets.key_length;
    if !KEY_LENGTHS.contains(&key_length) || !key_length.is_multiple_of(2) {
        return Err(invalid(
            "secrets.key_length",
            format!(
                "must be even and between {} and {}, got {key_length}",
                KEY_LENGTHS.start(),
                KEY_LENGTHS.end()
            ),
        ));
    }

    elastic(&config.elastic)?;
    health(&config.health)?;
    retention(&config.logs)
}

fn stack_name(stack: &StackSection) -> Result<(), ConfigError> {
    let name = stack.name.as_str();
    let well_formed = name.len() <= MAX_STACK_NAME_LEN
        && name.starts_with(|c: char| c.is_ascii_lowercase())
        && !name.ends_with('-')
        && name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');

    if well_formed {
        Ok(())
    } else {
        Err(invalid(
            "stack.name",
            format!(
                "'{name}' must be 1-{MAX_STACK_NAME_LEN} lowercase letters, digits or hyphens, \
                 starting with a letter"
            ),
        ))
    }
}

fn elastic(elastic: &ElasticConfig) -> Result<(), ConfigError> {
    if elastic.desired_count < 2 {
        return Err(invalid(
            "elastic.desired_count",
            format!("must be at least 2, got {}", elastic.desired_count),
        ));
    }
    if elastic.max_count < elastic.desired_count {
        return Err(invalid(
            "elastic.max_count",
            format!("{} is below desired_count {}", elastic.max_count, elastic.desired_count),
        ));
    }
    if elastic.cpu_target_percent == 0 || elastic.cpu_target_percent > 100 {
        return Err(invalid("elastic.cpu_target_percent", "must be between 1 and 100"));
    }

    let Some(&(_, min_mem, max_mem)) =
        TASK_SIZES.iter().find(|(cpu, _, _)| *cpu == elastic.cpu_units)
    else {
        return Err(invalid(
            "elastic.cpu_units",
            format!("{} is not a supported task size", elastic.cpu_units),
        ));
    };
    if !(min_mem..=max_mem).contains(&elastic.memory_mib) {
        return Err(invalid(
            "elastic.memory_mib",
            format!(
                "{} MiB is outside {min_mem}..={max_mem} for {} cpu units",
                elastic.memory_mib, elastic.cpu_units
            ),
        ));
    }
    Ok(())
}

fn health(health: &HealthCheckConfig) -> Result<(), ConfigError> {
    if !(5..=300).contains(&health.interval_seconds) {
        return Err(invalid("health.interval_seconds", "must be between 5 and 300"));
    }
    if !(2..=120).contains(&health.timeout_seconds) {
        return Err(invalid("health.timeout_seconds", "must be between 2 and 120"));
    }
    if health.timeout_seconds >= health.interval_seconds {
        return Err(invalid("health.timeout_seconds", "must be shorter than the interval"));
    }
    for (key, value) in [
        ("health.healthy_threshold", health.healthy_threshold),
        ("health.unhealthy_threshold", health.unhealthy_threshold),
    ] {
        if !(2..=10).contains(&value) {
            return Err(invalid(key, "must be between 2 and 10"));
        }
    }
    Ok(())
}

fn retention(logs: &LogRetentionConfig) -> Result<(), ConfigError> {
    for environment in Environment::ALL {
        let days = logs.days_for(environment);
        if !RETENTION_DAYS.contains(&days) {
            return Err(invalid(
                "logs",
                format!("{days} days is not a supported retention period for {environment}"),
            ));
        }
    }
    Ok(())
}

fn invalid(key: &'static str, message: impl Into<Cow<'static, str>>) -> ConfigError {
    ConfigError::Invalid { message: message.into(), context: Some(key.into()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> StackConfig {
        StackConfig::default()
    }

    #[test]
    fn defaults_pass_for_every_environment() {
        for env in Environment::ALL {
            validate(&config(), env).unwrap();
        }
    }

    #[test]
    fn rejects_single_replica_elastic() {
        let mut cfg = config();
        cfg.elastic.desired_count = 1;
        let err = validate(&cfg, Environment::Prod).unwrap_err();
        assert!(err.to_string().contains("elastic.desired_count"), "{err}");
    }

    #[test]
    fn rejects_max_below_desired() {
        let mut cfg = config();
        cfg.elastic.desired_count = 3;
        cfg.elastic.max_count = 2;
        assert!(validate(&cfg, Environment::Dev).is_err());
    }

    #[test]
    fn rejects_memory_outside_task_size() {
        let mut cfg = config();
        cfg.elastic.memory_mib = 512;
        let err = validate(&cfg, Environment::Prod).unwrap_err();
        assert!(err.to_string().contains("elastic.memory_mib"), "{err}");
    }

    #[test]
    fn prod_needs_two_zones() {
        let mut cfg = config();
        cfg.network.max_azs = 1;
        assert!(validate(&cfg, Environment::Dev).is_ok());
        assert!(validate(&cfg, Environment::Prod).is_err());
    }

    #[test]
    fn rejects_bad_stack_names() {
        for name in ["", "Typesense", "9lives", "search-", "with space"] {
            let mut cfg = config();
            cfg.stack.name = name.to_owned();
            assert!(validate(&cfg, Environment::Dev).is_err(), "{name:?} should be rejected");
        }
    }

    #[test]
    fn rejects_unsupported_retention() {
        let mut cfg = config();
        cfg.logs.stage_days = 10;
        let err = validate(&cfg, Environment::Dev).unwrap_err();
        assert_eq!(err.variant(), "Invalid");
    }

    #[test]
    fn rejects_short_or_odd_key_lengths() {
        for key_length in [0, 16, 63, 258] {
            let mut cfg = config();
            cfg.secrets.key_length = key_length;
            let err = validate(&cfg, Environment::Stage).unwrap_err();
            assert!(err.to_string().contains("secrets.key_length"), "{err}");
        }
    }

    #[test]
    fn rejects_timeout_not_below_interval() {
        let mut cfg = config();
        cfg.health.interval_seconds = 10;
        cfg.health.timeout_seconds = 10;
        assert!(validate(&cfg, Environment::Prod).is_err());
    }
}
