use proptest::prelude::*;
use sdeck::domain::Environment;
use sdeck::domain::config::StackConfig;
use sdeck::features::compute::ComputeTopology;
use sdeck::features::outputs::{OutputKey, expected_keys};
use sdeck::{ErrorClass, Stack, StackError, parse_environment};
use std::io;
use std::sync::Arc;

fn synthesize(environment: Environment) -> sdeck::SynthesizedStack {
    Stack::new(StackConfig::default(), environment).unwrap().synthesize().unwrap()
}

/// Longest run of hex digits in `text`.
fn longest_hex_run(text: &str) -> usize {
    text.split(|c: char| !c.is_ascii_hexdigit()).map(str::len).max().unwrap_or_default()
}

#[derive(Clone, Default)]
struct CapturedLogs(Arc<parking_lot::Mutex<Vec<u8>>>);

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn dev_and_stage_are_single_instances() {
    for environment in [Environment::Dev, Environment::Stage] {
        let stack = synthesize(environment);
        assert!(matches!(
            stack.topology.topology(),
            ComputeTopology::PersistentInstance { min_count: 1, max_count: 1, .. }
        ));
        assert!(stack.topology.load_balancer().is_none());
        assert!(stack.outputs.contains(OutputKey::ClusterName));
    }
}

#[test]
fn prod_is_elastic_with_load_balancer() {
    let stack = synthesize(Environment::Prod);
    let ComputeTopology::Elastic { desired_count, .. } = stack.topology.topology() else {
        panic!("prod must be elastic");
    };
    assert!(*desired_count >= 2);
    assert!(stack.topology.load_balancer().is_some());
    assert!(!stack.outputs.contains(OutputKey::ClusterName));
    assert!(!stack.outputs.contains(OutputKey::ServiceName));
}

#[test]
fn output_keys_match_contract() {
    for environment in Environment::ALL {
        let stack = synthesize(environment);
        assert_eq!(stack.outputs.keys().collect::<Vec<_>>(), expected_keys(environment));
    }
}

#[test]
fn invalid_environment_is_a_configuration_error() {
    for raw in ["production", "", "qa", "dev1"] {
        let err = parse_environment(raw).unwrap_err();
        assert!(matches!(err, StackError::InvalidEnvironment { .. }));
        assert_eq!(err.class(), ErrorClass::Configuration);
    }
    assert_eq!(parse_environment(" PROD ").unwrap(), Environment::Prod);
}

#[test]
fn invalid_config_fails_before_synthesis() {
    let mut config = StackConfig::default();
    config.elastic.desired_count = 1;
    let err = Stack::new(config, Environment::Prod).unwrap_err();
    assert_eq!(err.class(), ErrorClass::Configuration);

    let mut config = StackConfig::default();
    config.network.cidr = "10.0.0.0/33".into();
    let err = Stack::new(config, Environment::Dev).unwrap_err();
    assert_eq!(err.class(), ErrorClass::Configuration);
}

#[test]
fn secret_holds_a_generated_api_key_document() {
    for environment in Environment::ALL {
        let stack = synthesize(environment);
        let doc = stack.graph.render().unwrap();
        let properties = &doc["Resources"]["ApiKeySecret"]["Properties"];

        assert_eq!(properties["Name"], format!("typesense-{environment}-api-key"));
        assert_eq!(properties["GenerateSecretString"]["GenerateStringKey"], "apiKey");
        assert_eq!(properties["GenerateSecretString"]["SecretStringTemplate"], "{}");
        assert!(properties.get("SecretString").is_none());

        let container = &doc["Resources"]["TaskDefinition"]["Properties"]["ContainerDefinitions"][0];
        assert_eq!(
            container["Secrets"][0]["ValueFrom"],
            serde_json::json!({ "Fn::Join": [":", [{ "Ref": "ApiKeySecret" }, "apiKey::"]] })
        );
    }
}

#[test]
fn no_credential_material_in_template_outputs_or_plan() {
    for environment in Environment::ALL {
        let stack = synthesize(environment);
        assert!(longest_hex_run(&stack.to_json_pretty().unwrap()) < 32);
        assert!(longest_hex_run(&serde_json::to_string(&stack.outputs).unwrap()) < 32);
        assert!(longest_hex_run(&stack.plan().to_string()) < 32);
    }
}

#[test]
fn synthesis_logs_name_the_secret_but_carry_no_value() {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_max_level(tracing::Level::TRACE)
        .finish();

    let stack = Stack::new(StackConfig::default(), Environment::Prod).unwrap();
    tracing::subscriber::with_default(subscriber, || stack.synthesize().unwrap());

    let text = String::from_utf8(logs.0.lock().clone()).unwrap();
    assert!(text.contains("Credential declared"), "{text}");
    assert!(text.contains("typesense-prod-api-key"), "{text}");
    assert!(!text.contains("SecretString"), "{text}");
    assert!(longest_hex_run(&text) < 32, "{text}");
}

#[test]
fn plan_lists_public_ingress_for_non_production() {
    let plan = synthesize(Environment::Dev).plan();
    assert_eq!(plan.public_ingress().map(|p| p.name).collect::<Vec<_>>(), ["PublicSearchApi"]);
    assert_eq!(plan.subnet_kind, "public");
    assert!(!plan.nat_gateway);
    assert!(plan.to_string().contains("! PublicSearchApi"));

    let plan = synthesize(Environment::Prod).plan();
    assert_eq!(plan.public_ingress().map(|p| p.name).collect::<Vec<_>>(), ["PublicHttpListener"]);
    assert_eq!(plan.subnet_kind, "private-with-egress");
    assert_eq!(plan.placement[0].cidr, "10.0.4.0/24");
}

#[test]
fn stack_tags_reach_resources() {
    let mut config = StackConfig::default();
    config.stack.tags.insert("team".into(), "search".into());
    let stack = Stack::new(config, Environment::Dev).unwrap().synthesize().unwrap();

    let doc = stack.graph.render().unwrap();
    let tags = doc["Resources"]["Vpc"]["Properties"]["Tags"].as_array().unwrap().clone();
    assert!(tags.iter().any(|t| t["Key"] == "team" && t["Value"] == "search"));
    assert!(tags.iter().any(|t| t["Key"] == "sdeck:environment" && t["Value"] == "dev"));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn resynthesis_is_structurally_equal(index in 0usize..3, cidr_second in 0u8..=255) {
        let environment = Environment::ALL[index];
        let mut config = StackConfig::default();
        config.network.cidr = format!("10.{cidr_second}.0.0/16");

        let stack = Stack::new(config, environment).unwrap();
        let first = stack.synthesize().unwrap();
        let second = stack.synthesize().unwrap();

        prop_assert_eq!(&first.graph, &second.graph);
        prop_assert_eq!(&first.outputs, &second.outputs);
        prop_assert_eq!(first.to_json_pretty().unwrap(), second.to_json_pretty().unwrap());
    }
}
