use sdeck_domain::Environment;
use sdeck_domain::config::{ElasticConfig, LogRetentionConfig, SecretsConfig, StackConfig};
use serde_json::json;

#[test]
fn config_defaults_are_sane() {
    let cfg = StackConfig::default();
    assert_eq!(cfg.stack.name, "typesense");
    assert_eq!(cfg.network.cidr, "10.0.0.0/16");
    assert_eq!(cfg.network.max_azs, 2);
    assert_eq!(cfg.persistent.instance_class, "t3.micro");
    assert!(cfg.service.enable_cors);

    let elastic = ElasticConfig::default();
    assert!(elastic.desired_count >= 2);
    assert!(elastic.max_count >= elastic.desired_count);

    assert_eq!(SecretsConfig::default().key_length, 64, "32 bytes of entropy, hex encoded");
}

#[test]
fn stack_config_deserializes_partial_sections() {
    let raw = json!({
        "stack": { "name": "search", "tags": { "team": "platform" } },
        "elastic": { "desired_count": 3 },
        "secrets": { "key_length": 128 }
    });

    let cfg: StackConfig = serde_json::from_value(raw).expect("config deserialize");
    assert_eq!(cfg.stack.name, "search");
    assert_eq!(cfg.stack.tags.get("team").map(String::as_str), Some("platform"));
    assert_eq!(cfg.elastic.desired_count, 3);
    assert_eq!(cfg.elastic.cpu_units, 512, "unspecified fields keep their defaults");
    assert_eq!(cfg.network.max_azs, 2, "unspecified sections keep their defaults");
    assert_eq!(cfg.secrets.key_length, 128);
}

#[test]
fn log_retention_follows_environment() {
    let logs = LogRetentionConfig::default();
    assert_eq!(logs.days_for(Environment::Dev), 7);
    assert_eq!(logs.days_for(Environment::Stage), 14);
    assert_eq!(logs.days_for(Environment::Prod), 30);
}

#[test]
fn environment_deserializes_lowercase_only_values() {
    let env: Environment = serde_json::from_value(json!("stage")).unwrap();
    assert_eq!(env, Environment::Stage);
    assert!(serde_json::from_value::<Environment>(json!("qa")).is_err());
}
