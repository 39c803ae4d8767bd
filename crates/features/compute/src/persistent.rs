//! Single long-lived instance for non-production environments.
//!
//! An auto scaling group pinned at one instance registers with the cluster through a
//! capacity provider; the task runs in `bridge` mode with the search port mapped straight
//! to the host, and the data directory is a host bind mount.
//!
//! The group itself has no address. Each instance associates the stack's elastic IP with
//! itself at boot, so the published endpoint is the elastic IP and a replacement instance
//! takes it over.

use crate::container::{ContainerSpec, DATA_VOLUME};
use crate::error::ComputeError;
use crate::resolver::{BuildContext, assume_role};
use crate::{ComputeTopology, IngressPolicy, IngressSource, ResolvedTopology, ServiceEndpoint};
use sdeck_domain::constants::{ANY_IPV4, SERVICE_PORT};
use sdeck_kernel::graph::{LogicalId, Resource, ResourceGraph, ResourceKind, intrinsic, tag};
use sdeck_network::SubnetKind;
use serde_json::json;
use tracing::debug;

/// ECS-optimized machine image, resolved at deploy time.
pub const ECS_OPTIMIZED_IMAGE: &str =
    "{{resolve:ssm:/aws/service/ecs/optimized-ami/amazon-linux-2023/recommended/image_id}}";

const INSTANCE_ROLE_POLICY: &str =
    "arn:aws:iam::aws:policy/service-role/AmazonEC2ContainerServiceforEC2Role";

const METADATA_URL: &str = "http://169.254.169.254/latest";

/// Fields of [`ComputeTopology::PersistentInstance`].
#[derive(Debug)]
pub(crate) struct Sizing {
    pub(crate) min_count: u32,
    pub(crate) max_count: u32,
    pub(crate) subnet_kind: SubnetKind,
    pub(crate) instance_class: String,
}

pub(crate) fn build(
    ctx: &BuildContext<'_>,
    sizing: Sizing,
    graph: &mut ResourceGraph,
) -> Result<ResolvedTopology, ComputeError> {
    let naming = ctx.naming;
    let placement = ctx.subnets(sizing.subnet_kind)?.to_vec();

    let security_group = graph.add(
        LogicalId::new("InstanceSecurityGroup")?,
        Resource::new(ResourceKind::SecurityGroup)
            .property("GroupDescription", format!("Search instance of {}", naming.prefix()))
            .property("VpcId", intrinsic::reference(ctx.network.vpc()))
            .property("Tags", json!([tag("Name", naming.physical("instance"))])),
    )?;

    let policy = IngressPolicy::PUBLIC_SEARCH_API;
    let ingress_source = match policy.source {
        IngressSource::AnyIpv4 => ANY_IPV4,
        IngressSource::LoadBalancer => {
            return Err("instance ingress cannot be scoped to a load balancer".into());
        }
    };
    graph.add(
        LogicalId::new(format!("{}Ingress", policy.name))?,
        Resource::new(ResourceKind::SecurityGroupIngress)
            .property("GroupId", intrinsic::attribute(&security_group, "GroupId"))
            .property("Description", policy.description)
            .property("IpProtocol", "tcp")
            .property("FromPort", policy.port)
            .property("ToPort", policy.port)
            .property("CidrIp", ingress_source),
    )?;

    let instance_role = graph.add(
        LogicalId::new("InstanceRole")?,
        Resource::new(ResourceKind::Role)
            .property("AssumeRolePolicyDocument", assume_role("ec2.amazonaws.com"))
            .property("ManagedPolicyArns", json!([INSTANCE_ROLE_POLICY]))
            .property(
                "Policies",
                json!([{
                    "PolicyName": "associate-instance-address",
                    "PolicyDocument": {
                        "Version": "2012-10-17",
                        "Statement": [{
                            "Effect": "Allow",
                            "Action": "ec2:AssociateAddress",
                            "Resource": "*",
                        }],
                    },
                }]),
            ),
    )?;
    let instance_profile = graph.add(
        LogicalId::new("InstanceProfile")?,
        Resource::new(ResourceKind::InstanceProfile)
            .property("Roles", json!([intrinsic::reference(&instance_role)])),
    )?;

    let address = graph.add(
        LogicalId::new("InstanceAddress")?,
        Resource::new(ResourceKind::ElasticIp)
            .property("Domain", "vpc")
            .property("Tags", json!([tag("Name", naming.physical("instance"))]))
            .depends_on(ctx.network.gateway_attachment()),
    )?;

    let host_data_path = &ctx.config.persistent.host_data_path;
    let user_data = intrinsic::base64(intrinsic::join(
        "",
        [
            json!("#!/bin/bash\nset -euo pipefail\necho ECS_CLUSTER="),
            intrinsic::reference(&ctx.cluster),
            json!(format!(
                " >> /etc/ecs/ecs.config\n\
                 mkdir -p {host_data_path}\n\
                 command -v aws >/dev/null || dnf install -y awscli\n\
                 TOKEN=$(curl -sX PUT {METADATA_URL}/api/token \
                 -H 'X-aws-ec2-metadata-token-ttl-seconds: 300')\n\
                 INSTANCE_ID=$(curl -s -H \"X-aws-ec2-metadata-token: $TOKEN\" \
                 {METADATA_URL}/meta-data/instance-id)\n\
                 aws ec2 associate-address --allow-reassociation --instance-id \"$INSTANCE_ID\" --region "
            )),
            intrinsic::pseudo("AWS::Region"),
            json!(" --allocation-id "),
            intrinsic::attribute(&address, "AllocationId"),
            json!("\n"),
        ],
    ));

    let launch_template = graph.add(
        LogicalId::new("LaunchTemplate")?,
        Resource::new(ResourceKind::LaunchTemplate).property(
            "LaunchTemplateData",
            json!({
                "ImageId": ECS_OPTIMIZED_IMAGE,
                "InstanceType": sizing.instance_class,
                "IamInstanceProfile": { "Arn": intrinsic::attribute(&instance_profile, "Arn") },
                "SecurityGroupIds": [intrinsic::attribute(&security_group, "GroupId")],
                "UserData": user_data,
            }),
        ),
    )?;

    let auto_scaling_group = graph.add(
        LogicalId::new("AutoScalingGroup")?,
        Resource::new(ResourceKind::AutoScalingGroup)
            .property("MinSize", sizing.min_count.to_string())
            .property("MaxSize", sizing.max_count.to_string())
            .property("DesiredCapacity", sizing.min_count.to_string())
            .property("NewInstancesProtectedFromScaleIn", false)
            .property("VPCZoneIdentifier", ctx.subnet_refs(sizing.subnet_kind)?)
            .property(
                "LaunchTemplate",
                json!({
                    "LaunchTemplateId": intrinsic::reference(&launch_template),
                    "Version": intrinsic::attribute(&launch_template, "LatestVersionNumber"),
                }),
            )
            .property(
                "Tags",
                json!([{ "Key": "Name", "Value": naming.physical("instance"), "PropagateAtLaunch": true }]),
            ),
    )?;

    let capacity_provider = graph.add(
        LogicalId::new("CapacityProvider")?,
        Resource::new(ResourceKind::CapacityProvider).property(
            "AutoScalingGroupProvider",
            json!({
                "AutoScalingGroupArn": intrinsic::reference(&auto_scaling_group),
                "ManagedScaling": { "Status": "ENABLED", "TargetCapacity": 100 },
                "ManagedTerminationProtection": "DISABLED",
            }),
        ),
    )?;
    let association = graph.add(
        LogicalId::new("CapacityProviderAssociation")?,
        Resource::new(ResourceKind::CapacityProviderAssociation)
            .property("Cluster", intrinsic::reference(&ctx.cluster))
            .property("CapacityProviders", json!([intrinsic::reference(&capacity_provider)]))
            .property(
                "DefaultCapacityProviderStrategy",
                json!([{ "CapacityProvider": intrinsic::reference(&capacity_provider), "Weight": 1 }]),
            ),
    )?;

    let container = ContainerSpec::builder()
        .image(ctx.config.service.image.as_str())
        .data_dir(ctx.config.service.data_dir.as_str())
        .enable_cors(ctx.config.service.enable_cors)
        .api_key_from(ctx.credential.field_reference())
        .log_group(intrinsic::reference(&ctx.log_group))
        .log_stream_prefix(naming.prefix())
        .host_port(SERVICE_PORT)
        .memory_reservation_mib(ctx.config.persistent.memory_reservation_mib)
        .mount_data_volume(true)
        .build();

    let task_definition = graph.add(
        LogicalId::new("TaskDefinition")?,
        Resource::new(ResourceKind::TaskDefinition)
            .property("Family", naming.physical("task"))
            .property("NetworkMode", "bridge")
            .property("RequiresCompatibilities", json!(["EC2"]))
            .property("ExecutionRoleArn", intrinsic::attribute(&ctx.execution_role, "Arn"))
            .property(
                "Volumes",
                json!([{ "Name": DATA_VOLUME, "Host": { "SourcePath": host_data_path } }]),
            )
            .property("ContainerDefinitions", json!([container.render()])),
    )?;

    let service = graph.add(
        LogicalId::new("Service")?,
        Resource::new(ResourceKind::Service)
            .property("ServiceName", naming.physical("service"))
            .property("Cluster", intrinsic::reference(&ctx.cluster))
            .property("TaskDefinition", intrinsic::reference(&task_definition))
            .property("DesiredCount", sizing.min_count)
            .property(
                "CapacityProviderStrategy",
                json!([{ "CapacityProvider": intrinsic::reference(&capacity_provider), "Weight": 1 }]),
            )
            // One host port on one instance: the old task has to stop before the new one starts.
            .property(
                "DeploymentConfiguration",
                json!({ "MinimumHealthyPercent": 0, "MaximumPercent": 100 }),
            )
            .depends_on(&association),
    )?;

    debug!(instance_class = %sizing.instance_class, subnets = placement.len(), "Persistent instance declared");

    Ok(ResolvedTopology {
        topology: ComputeTopology::PersistentInstance {
            min_count: sizing.min_count,
            max_count: sizing.max_count,
            subnet_kind: sizing.subnet_kind,
            instance_class: sizing.instance_class,
        },
        endpoint: ServiceEndpoint::InstancePublicAddress { address },
        cluster: ctx.cluster.clone(),
        service,
        load_balancer: None,
        placement,
        ingress: vec![policy],
    })
}
