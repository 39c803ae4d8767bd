use crate::error::ComputeError;
use crate::{ComputeTopology, ResolvedTopology, elastic, persistent};
use sdeck_domain::config::StackConfig;
use sdeck_domain::{Environment, Naming};
use sdeck_kernel::graph::{LogicalId, Resource, ResourceGraph, ResourceKind, intrinsic};
use sdeck_network::{NetworkHandle, SubnetKind};
use sdeck_secrets::CredentialHandle;
use serde_json::json;
use tracing::{info, warn};

const TASK_EXECUTION_POLICY: &str =
    "arn:aws:iam::aws:policy/service-role/AmazonECSTaskExecutionRolePolicy";

/// The environment-to-topology decision. Nothing else in the workspace branches on the
/// environment to pick a compute shape.
///
/// `dev` and `stage` get a single public instance; `prod` gets load-balanced elastic tasks.
#[must_use]
pub fn topology_for(environment: Environment, config: &StackConfig) -> ComputeTopology {
    match environment {
        Environment::Dev | Environment::Stage => ComputeTopology::PersistentInstance {
            min_count: 1,
            max_count: 1,
            subnet_kind: SubnetKind::Public,
            instance_class: config.persistent.instance_class.clone(),
        },
        Environment::Prod => ComputeTopology::Elastic {
            desired_count: config.elastic.desired_count,
            cpu_units: config.elastic.cpu_units,
            memory_mib: config.elastic.memory_mib,
        },
    }
}

/// Everything a topology builder reads. Shared handles are borrowed, never mutated.
#[derive(Debug)]
pub(crate) struct BuildContext<'a> {
    pub(crate) config: &'a StackConfig,
    pub(crate) naming: &'a Naming,
    pub(crate) network: &'a NetworkHandle,
    pub(crate) credential: &'a CredentialHandle,
    pub(crate) cluster: LogicalId,
    pub(crate) log_group: LogicalId,
    pub(crate) execution_role: LogicalId,
}

impl BuildContext<'_> {
    pub(crate) fn subnets(&self, kind: SubnetKind) -> Result<&[LogicalId], ComputeError> {
        let subnets = self.network.subnets(kind);
        if subnets.is_empty() {
            Err(ComputeError::MissingSubnets { kind, context: None })
        } else {
            Ok(subnets)
        }
    }

    pub(crate) fn subnet_refs(&self, kind: SubnetKind) -> Result<serde_json::Value, ComputeError> {
        Ok(self.subnets(kind)?.iter().map(intrinsic::reference).collect())
    }
}

/// Resolves the compute topology of one environment and declares its resources.
#[derive(Debug)]
pub struct TopologyResolver<'a> {
    config: &'a StackConfig,
    environment: Environment,
    naming: Naming,
}

impl<'a> TopologyResolver<'a> {
    #[must_use]
    pub fn new(config: &'a StackConfig, environment: Environment) -> Self {
        Self { config, environment, naming: Naming::new(&config.stack.name, environment) }
    }

    /// The topology this resolver will build, without touching any graph.
    #[must_use]
    pub fn topology(&self) -> ComputeTopology {
        topology_for(self.environment, self.config)
    }

    /// Picks the topology and hands it to that topology's builder, wired to the shared
    /// network and credential.
    ///
    /// # Errors
    /// * [`ComputeError::MissingSubnets`] If the network lacks the tier the topology needs.
    /// * [`ComputeError::Graph`] If a logical id collides.
    pub fn resolve(
        &self,
        network: &NetworkHandle,
        credential: &CredentialHandle,
        graph: &mut ResourceGraph,
    ) -> Result<ResolvedTopology, ComputeError> {
        let topology = self.topology();
        info!(environment = %self.environment, topology = %topology, "Topology resolved");

        // Placement is checked before the first resource is declared.
        if let Some(&kind) =
            topology.required_subnets().iter().find(|kind| network.subnets(**kind).is_empty())
        {
            return Err(ComputeError::MissingSubnets { kind, context: None });
        }

        let ctx = self.shared(network, credential, graph)?;
        let resolved = match topology {
            ComputeTopology::PersistentInstance { min_count, max_count, subnet_kind, instance_class } => {
                persistent::build(
                    &ctx,
                    persistent::Sizing { min_count, max_count, subnet_kind, instance_class },
                    graph,
                )?
            }
            ComputeTopology::Elastic { desired_count, cpu_units, memory_mib } => elastic::build(
                &ctx,
                elastic::Sizing { desired_count, cpu_units, memory_mib },
                graph,
            )?,
        };

        for policy in resolved.ingress().iter().filter(|p| p.is_public()) {
            warn!(
                policy = policy.name,
                port = policy.port,
                source = %policy.source,
                "Ingress open to any IPv4 source"
            );
        }
        Ok(resolved)
    }

    /// Cluster, log group and execution role, declared for either topology.
    fn shared<'b>(
        &'b self,
        network: &'b NetworkHandle,
        credential: &'b CredentialHandle,
        graph: &mut ResourceGraph,
    ) -> Result<BuildContext<'b>, ComputeError> {
        let cluster = graph.add(
            LogicalId::new("Cluster")?,
            Resource::new(ResourceKind::Cluster)
                .property("ClusterName", self.naming.physical("cluster")),
        )?;

        let log_group = graph.add(
            LogicalId::new("ServiceLogGroup")?,
            Resource::new(ResourceKind::LogGroup)
                .property("LogGroupName", format!("/sdeck/{}", self.naming.prefix()))
                .property("RetentionInDays", self.config.logs.days_for(self.environment)),
        )?;

        let execution_role = graph.add(
            LogicalId::new("TaskExecutionRole")?,
            Resource::new(ResourceKind::Role)
                .property("AssumeRolePolicyDocument", assume_role("ecs-tasks.amazonaws.com"))
                .property("ManagedPolicyArns", json!([TASK_EXECUTION_POLICY]))
                .property(
                    "Policies",
                    json!([{
                        "PolicyName": "ReadApiKeySecret",
                        "PolicyDocument": {
                            "Version": "2012-10-17",
                            "Statement": [{
                                "Effect": "Allow",
                                "Action": ["secretsmanager:GetSecretValue"],
                                "Resource": credential.arn(),
                            }],
                        },
                    }]),
                ),
        )?;

        Ok(BuildContext {
            config: self.config,
            naming: &self.naming,
            network,
            credential,
            cluster,
            log_group,
            execution_role,
        })
    }
}

/// Trust policy letting `service` assume a role.
pub(crate) fn assume_role(service: &str) -> serde_json::Value {
    json!({
        "Version": "2012-10-17",
        "Statement": [{
            "Effect": "Allow",
            "Principal": { "Service": service },
            "Action": "sts:AssumeRole",
        }],
    })
}
