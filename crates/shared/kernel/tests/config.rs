use sdeck_kernel::config::{ConfigError, load_config, validate};
use sdeck_kernel::domain::Environment;
use sdeck_kernel::domain::config::StackConfig;
use std::io::Write;

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn missing_default_file_yields_defaults() {
    let cfg: StackConfig = load_config(None::<&str>).unwrap();
    assert_eq!(cfg.stack.name, "typesense");
    assert_eq!(cfg.elastic.desired_count, 2);
}

#[test]
fn explicit_file_must_exist() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_config::<StackConfig>(Some(dir.path().join("absent.toml"))).unwrap_err();
    assert!(matches!(err, ConfigError::Config { .. }));
}

#[test]
fn file_values_override_defaults() {
    let file = write_config(
        r#"
        [stack]
        name = "search"

        [stack.tags]
        team = "platform"

        [elastic]
        desired_count = 3
        max_count = 6

        [logs]
        prod_days = 90
        "#,
    );

    let cfg: StackConfig = load_config(Some(file.path())).unwrap();
    assert_eq!(cfg.stack.name, "search");
    assert_eq!(cfg.stack.tags["team"], "platform");
    assert_eq!(cfg.elastic.desired_count, 3);
    assert_eq!(cfg.elastic.memory_mib, 1024);
    assert_eq!(cfg.logs.prod_days, 90);
    validate(&cfg, Environment::Prod).unwrap();
}

#[test]
fn malformed_values_are_reported_with_context() {
    let file = write_config("[elastic]\ndesired_count = \"many\"\n");
    let err = load_config::<StackConfig>(Some(file.path())).unwrap_err();
    assert!(err.to_string().contains("Failed to deserialize config"), "{err}");
}

#[test]
fn loaded_but_invalid_values_fail_validation() {
    let file = write_config("[elastic]\ndesired_count = 1\n");
    let cfg: StackConfig = load_config(Some(file.path())).unwrap();
    let err = validate(&cfg, Environment::Prod).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { .. }));
}
