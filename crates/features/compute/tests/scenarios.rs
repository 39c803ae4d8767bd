use sdeck_compute::{
    ComputeError, ComputeTopology, IngressPolicy, IngressSource, ResolvedTopology, ServiceEndpoint,
    TopologyResolver,
};
use sdeck_domain::config::StackConfig;
use sdeck_domain::{Environment, Naming};
use sdeck_kernel::graph::{ResourceGraph, ResourceKind};
use sdeck_network::{NetworkHandle, NetworkPlan, NetworkProvisioner, SubnetKind};
use proptest::prelude::*;
use sdeck_secrets::{CredentialHandle, SecretProvisioner};
use serde_json::{Value, json};

struct Scenario {
    graph: ResourceGraph,
    network: NetworkHandle,
    credential: CredentialHandle,
}

fn scenario(config: &StackConfig, network_env: Environment) -> Scenario {
    let naming = Naming::new(&config.stack.name, network_env);
    let mut graph = ResourceGraph::new("scenario");
    let credential =
        SecretProvisioner::new(naming.clone(), &config.secrets).provision(&mut graph).unwrap();
    let plan = NetworkPlan::new(&config.network, network_env).unwrap();
    let network = NetworkProvisioner::new(naming).provision(&mut graph, &plan).unwrap();
    Scenario { graph, network, credential }
}

fn resolve(environment: Environment) -> (ResolvedTopology, Scenario) {
    resolve_with(&StackConfig::default(), environment)
}

fn resolve_with(config: &StackConfig, environment: Environment) -> (ResolvedTopology, Scenario) {
    let mut s = scenario(config, environment);
    let resolved = TopologyResolver::new(config, environment)
        .resolve(&s.network, &s.credential, &mut s.graph)
        .unwrap();
    (resolved, s)
}

fn properties(doc: &Value, id: &str) -> Value {
    doc["Resources"][id]["Properties"].clone()
}

#[test]
fn dev_is_a_single_public_instance() {
    let (resolved, s) = resolve(Environment::Dev);
    s.graph.validate().unwrap();

    assert!(matches!(resolved.topology(), ComputeTopology::PersistentInstance { .. }));
    assert!(resolved.load_balancer().is_none());
    assert_eq!(resolved.placement(), s.network.subnets(SubnetKind::Public));
    assert_eq!(resolved.ingress(), [IngressPolicy::PUBLIC_SEARCH_API]);
    assert_eq!(s.graph.of_kind(ResourceKind::LoadBalancer).count(), 0);

    let doc = s.graph.render().unwrap();
    let asg = properties(&doc, "AutoScalingGroup");
    assert_eq!(asg["MinSize"], "1");
    assert_eq!(asg["MaxSize"], "1");

    let rule = properties(&doc, "PublicSearchApiIngress");
    assert_eq!(rule["IpProtocol"], "tcp");
    assert_eq!(rule["FromPort"], 8108);
    assert_eq!(rule["ToPort"], 8108);
    assert_eq!(rule["CidrIp"], "0.0.0.0/0");

    let task = properties(&doc, "TaskDefinition");
    assert_eq!(task["NetworkMode"], "bridge");
    assert_eq!(task["Volumes"][0]["Host"]["SourcePath"], "/opt/typesense/data");
    assert_eq!(task["ContainerDefinitions"][0]["PortMappings"][0]["HostPort"], 8108);
}

#[test]
fn instance_takes_over_the_published_address() {
    let (resolved, s) = resolve(Environment::Dev);
    let ServiceEndpoint::InstancePublicAddress { address } = resolved.endpoint() else {
        panic!("dev must publish the instance address");
    };
    assert_eq!(address.as_str(), "InstanceAddress");
    assert_eq!(
        resolved.endpoint().address(),
        json!({ "Fn::GetAtt": ["InstanceAddress", "PublicIp"] })
    );

    let doc = s.graph.render().unwrap();
    assert_eq!(doc["Resources"]["InstanceAddress"]["Type"], "AWS::EC2::EIP");
    assert_eq!(doc["Resources"]["InstanceAddress"]["DependsOn"], json!(["GatewayAttachment"]));

    let user_data = &properties(&doc, "LaunchTemplate")["LaunchTemplateData"]["UserData"]["Fn::Base64"];
    let parts = user_data["Fn::Join"][1].as_array().unwrap();
    assert!(parts.contains(&json!({ "Fn::GetAtt": ["InstanceAddress", "AllocationId"] })));
    assert!(parts.iter().any(|p| p.as_str().is_some_and(|t| t.contains("associate-address"))));

    let role = properties(&doc, "InstanceRole");
    assert_eq!(
        role["Policies"][0]["PolicyDocument"]["Statement"][0]["Action"],
        "ec2:AssociateAddress"
    );
}

#[test]
fn stage_matches_dev_shape() {
    let (dev, _) = resolve(Environment::Dev);
    let (stage, _) = resolve(Environment::Stage);
    assert_eq!(dev.topology(), stage.topology());
    assert_eq!(dev.ingress(), stage.ingress());
}

#[test]
fn prod_is_elastic_behind_a_load_balancer() {
    let (resolved, s) = resolve(Environment::Prod);
    s.graph.validate().unwrap();

    let ComputeTopology::Elastic { desired_count, .. } = resolved.topology() else {
        panic!("prod must be elastic");
    };
    assert!(*desired_count >= 2);
    assert!(resolved.load_balancer().is_some());
    assert!(matches!(resolved.endpoint(), ServiceEndpoint::LoadBalancerDns { .. }));
    assert_eq!(resolved.placement(), s.network.subnets(SubnetKind::PrivateWithEgress));
    assert!(resolved.ingress().iter().all(|p| p.source == IngressSource::LoadBalancer || p.port == 80));

    let doc = s.graph.render().unwrap();
    let target_group = properties(&doc, "TargetGroup");
    assert_eq!(target_group["HealthCheckPath"], "/health");
    assert_eq!(target_group["Port"], 8108);

    let service = properties(&doc, "Service");
    assert_eq!(service["LaunchType"], "FARGATE");
    assert_eq!(service["DesiredCount"], json!(desired_count));
    let vpc_config = &service["NetworkConfiguration"]["AwsvpcConfiguration"];
    assert_eq!(vpc_config["AssignPublicIp"], "DISABLED");
    let private: Vec<Value> = s
        .network
        .subnets(SubnetKind::PrivateWithEgress)
        .iter()
        .map(|id| json!({ "Ref": id.as_str() }))
        .collect();
    assert_eq!(vpc_config["Subnets"], Value::Array(private));

    // No rule opens the search port to the internet.
    let search_rule = properties(&doc, "LoadBalancerToServiceIngress");
    assert!(search_rule.get("CidrIp").is_none());
    assert_eq!(search_rule["SourceSecurityGroupId"]["Fn::GetAtt"][0], "LoadBalancerSecurityGroup");
}

#[test]
fn container_reads_credential_by_reference() {
    for environment in Environment::ALL {
        let (_, s) = resolve(environment);
        let doc = s.graph.render().unwrap();
        let container = &properties(&doc, "TaskDefinition")["ContainerDefinitions"][0];
        assert_eq!(container["Secrets"][0]["Name"], "TYPESENSE_API_KEY");
        assert_eq!(container["Secrets"][0]["ValueFrom"], s.credential.field_reference());
        assert_eq!(container["Command"], json!(["--data-dir", "/data", "--enable-cors"]));
    }
}

#[test]
fn missing_tier_fails_before_declaring_anything() {
    let config = StackConfig::default();
    // A non-production network has no private tier.
    let mut s = scenario(&config, Environment::Dev);
    let before = s.graph.len();

    let err = TopologyResolver::new(&config, Environment::Prod)
        .resolve(&s.network, &s.credential, &mut s.graph)
        .unwrap_err();

    assert!(matches!(err, ComputeError::MissingSubnets { kind: SubnetKind::PrivateWithEgress, .. }));
    assert_eq!(s.graph.len(), before);
}

#[test]
fn log_retention_follows_environment() {
    for (environment, days) in [(Environment::Dev, 7), (Environment::Stage, 14), (Environment::Prod, 30)] {
        let (_, s) = resolve(environment);
        let doc = s.graph.render().unwrap();
        assert_eq!(properties(&doc, "ServiceLogGroup")["RetentionInDays"], days);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn elastic_sizing_reaches_service_and_scaling(desired in 2u32..=10, headroom in 0u32..=10, target in 10u8..=90) {
        let mut config = StackConfig::default();
        config.elastic.desired_count = desired;
        config.elastic.max_count = desired + headroom;
        config.elastic.cpu_target_percent = target;

        let (resolved, s) = resolve_with(&config, Environment::Prod);
        prop_assert!(
            matches!(resolved.topology(), ComputeTopology::Elastic { desired_count, .. } if *desired_count == desired),
            "topology should be Elastic with the configured desired_count"
        );

        let doc = s.graph.render().unwrap();
        prop_assert_eq!(&properties(&doc, "Service")["DesiredCount"], &json!(desired));
        let scaling = properties(&doc, "ScalableTarget");
        prop_assert_eq!(&scaling["MinCapacity"], &json!(desired));
        prop_assert_eq!(&scaling["MaxCapacity"], &json!(desired + headroom));
        prop_assert_eq!(
            &properties(&doc, "CpuScalingPolicy")["TargetTrackingScalingPolicyConfiguration"]["TargetValue"],
            &json!(target)
        );
    }
}
