//! Load-balanced managed tasks for production.
//!
//! Tasks run in `awsvpc` mode in the private-with-egress subnets without public addresses.
//! A public application load balancer forwards port 80 to them and probes `/health`;
//! replacement of failing tasks is left to the service scheduler.

use crate::container::ContainerSpec;
use crate::error::ComputeError;
use crate::resolver::BuildContext;
use crate::{ComputeTopology, IngressPolicy, IngressSource, ResolvedTopology, ServiceEndpoint};
use sdeck_domain::constants::{ANY_IPV4, CONTAINER_NAME, HEALTH_CHECK_PATH, SERVICE_PORT};
use sdeck_kernel::graph::{LogicalId, Resource, ResourceGraph, ResourceKind, intrinsic, tag};
use sdeck_network::SubnetKind;
use serde_json::{Value, json};
use tracing::debug;

/// Seconds a new task may fail health checks before the scheduler counts them.
const HEALTH_CHECK_GRACE_SECONDS: u32 = 60;

/// Fields of [`ComputeTopology::Elastic`].
#[derive(Debug)]
pub(crate) struct Sizing {
    pub(crate) desired_count: u32,
    pub(crate) cpu_units: u32,
    pub(crate) memory_mib: u32,
}

pub(crate) fn build(
    ctx: &BuildContext<'_>,
    sizing: Sizing,
    graph: &mut ResourceGraph,
) -> Result<ResolvedTopology, ComputeError> {
    let naming = ctx.naming;
    let vpc = intrinsic::reference(ctx.network.vpc());
    let placement = ctx.subnets(SubnetKind::PrivateWithEgress)?.to_vec();

    let lb_security_group = graph.add(
        LogicalId::new("LoadBalancerSecurityGroup")?,
        Resource::new(ResourceKind::SecurityGroup)
            .property("GroupDescription", format!("Load balancer of {}", naming.prefix()))
            .property("VpcId", vpc.clone())
            .property("Tags", json!([tag("Name", naming.physical("lb"))])),
    )?;
    let service_security_group = graph.add(
        LogicalId::new("ServiceSecurityGroup")?,
        Resource::new(ResourceKind::SecurityGroup)
            .property("GroupDescription", format!("Search tasks of {}", naming.prefix()))
            .property("VpcId", vpc.clone())
            .property("Tags", json!([tag("Name", naming.physical("service"))])),
    )?;

    let ingress = vec![IngressPolicy::PUBLIC_HTTP_LISTENER, IngressPolicy::LOAD_BALANCER_TO_SERVICE];
    for policy in &ingress {
        let (target, source_key, source): (&LogicalId, &str, Value) = match policy.source {
            IngressSource::AnyIpv4 => (&lb_security_group, "CidrIp", json!(ANY_IPV4)),
            IngressSource::LoadBalancer => (
                &service_security_group,
                "SourceSecurityGroupId",
                intrinsic::attribute(&lb_security_group, "GroupId"),
            ),
        };
        graph.add(
            LogicalId::new(format!("{}Ingress", policy.name))?,
            Resource::new(ResourceKind::SecurityGroupIngress)
                .property("GroupId", intrinsic::attribute(target, "GroupId"))
                .property("Description", policy.description)
                .property("IpProtocol", "tcp")
                .property("FromPort", policy.port)
                .property("ToPort", policy.port)
                .property(source_key, source),
        )?;
    }

    let load_balancer = graph.add(
        LogicalId::new("LoadBalancer")?,
        Resource::new(ResourceKind::LoadBalancer)
            .property("Name", naming.physical("lb"))
            .property("Type", "application")
            .property("Scheme", "internet-facing")
            .property("Subnets", ctx.subnet_refs(SubnetKind::Public)?)
            .property(
                "SecurityGroups",
                json!([intrinsic::attribute(&lb_security_group, "GroupId")]),
            ),
    )?;

    let health = &ctx.config.health;
    let target_group = graph.add(
        LogicalId::new("TargetGroup")?,
        Resource::new(ResourceKind::TargetGroup)
            .property("Port", SERVICE_PORT)
            .property("Protocol", "HTTP")
            .property("TargetType", "ip")
            .property("VpcId", vpc)
            .property("HealthCheckEnabled", true)
            .property("HealthCheckProtocol", "HTTP")
            .property("HealthCheckPath", HEALTH_CHECK_PATH)
            .property("HealthCheckIntervalSeconds", health.interval_seconds)
            .property("HealthCheckTimeoutSeconds", health.timeout_seconds)
            .property("HealthyThresholdCount", health.healthy_threshold)
            .property("UnhealthyThresholdCount", health.unhealthy_threshold)
            .property("Matcher", json!({ "HttpCode": "200" })),
    )?;

    let listener = graph.add(
        LogicalId::new("Listener")?,
        Resource::new(ResourceKind::Listener)
            .property("LoadBalancerArn", intrinsic::reference(&load_balancer))
            .property("Port", IngressPolicy::PUBLIC_HTTP_LISTENER.port)
            .property("Protocol", "HTTP")
            .property(
                "DefaultActions",
                json!([{ "Type": "forward", "TargetGroupArn": intrinsic::reference(&target_group) }]),
            ),
    )?;

    let container = ContainerSpec::builder()
        .image(ctx.config.service.image.as_str())
        .data_dir(ctx.config.service.data_dir.as_str())
        .enable_cors(ctx.config.service.enable_cors)
        .api_key_from(ctx.credential.field_reference())
        .log_group(intrinsic::reference(&ctx.log_group))
        .log_stream_prefix(naming.prefix())
        .build();

    let task_definition = graph.add(
        LogicalId::new("TaskDefinition")?,
        Resource::new(ResourceKind::TaskDefinition)
            .property("Family", naming.physical("task"))
            .property("NetworkMode", "awsvpc")
            .property("RequiresCompatibilities", json!(["FARGATE"]))
            .property("Cpu", sizing.cpu_units.to_string())
            .property("Memory", sizing.memory_mib.to_string())
            .property("ExecutionRoleArn", intrinsic::attribute(&ctx.execution_role, "Arn"))
            .property("ContainerDefinitions", json!([container.render()])),
    )?;

    let service = graph.add(
        LogicalId::new("Service")?,
        Resource::new(ResourceKind::Service)
            .property("ServiceName", naming.physical("service"))
            .property("Cluster", intrinsic::reference(&ctx.cluster))
            .property("TaskDefinition", intrinsic::reference(&task_definition))
            .property("LaunchType", "FARGATE")
            .property("DesiredCount", sizing.desired_count)
            .property("HealthCheckGracePeriodSeconds", HEALTH_CHECK_GRACE_SECONDS)
            .property(
                "NetworkConfiguration",
                json!({
                    "AwsvpcConfiguration": {
                        "AssignPublicIp": "DISABLED",
                        "Subnets": ctx.subnet_refs(SubnetKind::PrivateWithEgress)?,
                        "SecurityGroups": [intrinsic::attribute(&service_security_group, "GroupId")],
                    },
                }),
            )
            .property(
                "LoadBalancers",
                json!([{
                    "ContainerName": CONTAINER_NAME,
                    "ContainerPort": SERVICE_PORT,
                    "TargetGroupArn": intrinsic::reference(&target_group),
                }]),
            )
            .property(
                "DeploymentConfiguration",
                json!({
                    "MinimumHealthyPercent": 50,
                    "MaximumPercent": 200,
                    "DeploymentCircuitBreaker": { "Enable": true, "Rollback": true },
                }),
            )
            .depends_on(&listener),
    )?;

    let scalable_target = graph.add(
        LogicalId::new("ScalableTarget")?,
        Resource::new(ResourceKind::ScalableTarget)
            .property("ServiceNamespace", "ecs")
            .property("ScalableDimension", "ecs:service:DesiredCount")
            .property("MinCapacity", sizing.desired_count)
            .property("MaxCapacity", ctx.config.elastic.max_count)
            .property(
                "ResourceId",
                intrinsic::join(
                    "/",
                    [
                        json!("service"),
                        intrinsic::reference(&ctx.cluster),
                        intrinsic::attribute(&service, "Name"),
                    ],
                ),
            ),
    )?;
    graph.add(
        LogicalId::new("CpuScalingPolicy")?,
        Resource::new(ResourceKind::ScalingPolicy)
            .property("PolicyName", naming.physical("cpu-target"))
            .property("PolicyType", "TargetTrackingScaling")
            .property("ScalingTargetId", intrinsic::reference(&scalable_target))
            .property(
                "TargetTrackingScalingPolicyConfiguration",
                json!({
                    "PredefinedMetricSpecification": {
                        "PredefinedMetricType": "ECSServiceAverageCPUUtilization",
                    },
                    "TargetValue": ctx.config.elastic.cpu_target_percent,
                }),
            ),
    )?;

    debug!(
        desired_count = sizing.desired_count,
        max_count = ctx.config.elastic.max_count,
        subnets = placement.len(),
        "Elastic service declared"
    );

    Ok(ResolvedTopology {
        topology: ComputeTopology::Elastic {
            desired_count: sizing.desired_count,
            cpu_units: sizing.cpu_units,
            memory_mib: sizing.memory_mib,
        },
        endpoint: ServiceEndpoint::LoadBalancerDns { load_balancer: load_balancer.clone() },
        cluster: ctx.cluster.clone(),
        service,
        load_balancer: Some(load_balancer),
        placement,
        ingress,
    })
}
