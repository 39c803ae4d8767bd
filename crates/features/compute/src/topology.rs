use crate::IngressPolicy;
use sdeck_kernel::graph::{LogicalId, intrinsic};
use sdeck_network::SubnetKind;
use serde_json::{Value, json};
use strum_macros::{Display, IntoStaticStr};

/// Compute shape of one stack instance. Exactly one exists per stack.
#[derive(Debug, Clone, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
pub enum ComputeTopology {
    /// One long-lived instance held at a fixed count by an auto scaling group.
    PersistentInstance { min_count: u32, max_count: u32, subnet_kind: SubnetKind, instance_class: String },
    /// Managed tasks behind a load balancer, scaled horizontally.
    Elastic { desired_count: u32, cpu_units: u32, memory_mib: u32 },
}

impl ComputeTopology {
    /// Subnet tier the workload runs in.
    #[must_use]
    pub const fn subnet_kind(&self) -> SubnetKind {
        match self {
            Self::PersistentInstance { subnet_kind, .. } => *subnet_kind,
            Self::Elastic { .. } => SubnetKind::PrivateWithEgress,
        }
    }

    /// Subnet tiers that must exist: the workload tier plus, for the load balancer, public.
    #[must_use]
    pub const fn required_subnets(&self) -> &'static [SubnetKind] {
        match self {
            Self::PersistentInstance { subnet_kind: SubnetKind::Public, .. } => &[SubnetKind::Public],
            Self::PersistentInstance { subnet_kind: SubnetKind::PrivateWithEgress, .. } => {
                &[SubnetKind::PrivateWithEgress]
            }
            Self::Elastic { .. } => &[SubnetKind::PrivateWithEgress, SubnetKind::Public],
        }
    }

    #[must_use]
    pub const fn is_elastic(&self) -> bool {
        matches!(self, Self::Elastic { .. })
    }
}

/// Externally reachable address of the search API, derived from the built topology.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceEndpoint {
    /// Elastic IP the single instance attaches to itself at boot. Survives instance replacement.
    InstancePublicAddress { address: LogicalId },
    /// DNS name of the load balancer. Stable across task replacement.
    LoadBalancerDns { load_balancer: LogicalId },
}

impl ServiceEndpoint {
    /// The address as a template value.
    #[must_use]
    pub fn address(&self) -> Value {
        match self {
            Self::InstancePublicAddress { address } => intrinsic::attribute(address, "PublicIp"),
            Self::LoadBalancerDns { load_balancer } => {
                intrinsic::attribute(load_balancer, "DNSName")
            }
        }
    }

    /// `http://<address>[:port]`, the value published as `api-url`.
    #[must_use]
    pub fn url(&self) -> Value {
        let suffix = match self {
            Self::InstancePublicAddress { .. } => {
                format!(":{}", sdeck_domain::constants::SERVICE_PORT)
            }
            Self::LoadBalancerDns { .. } => String::new(),
        };
        intrinsic::join("", [json!("http://"), self.address(), json!(suffix)])
    }
}

/// A materialized topology: the chosen variant plus the ids the output layer reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTopology {
    pub(crate) topology: ComputeTopology,
    pub(crate) endpoint: ServiceEndpoint,
    pub(crate) cluster: LogicalId,
    pub(crate) service: LogicalId,
    pub(crate) load_balancer: Option<LogicalId>,
    pub(crate) placement: Vec<LogicalId>,
    pub(crate) ingress: Vec<IngressPolicy>,
}

impl ResolvedTopology {
    #[must_use]
    pub const fn topology(&self) -> &ComputeTopology {
        &self.topology
    }

    #[must_use]
    pub const fn endpoint(&self) -> &ServiceEndpoint {
        &self.endpoint
    }

    #[must_use]
    pub const fn cluster(&self) -> &LogicalId {
        &self.cluster
    }

    #[must_use]
    pub const fn service(&self) -> &LogicalId {
        &self.service
    }

    /// Present exactly for the elastic topology.
    #[must_use]
    pub const fn load_balancer(&self) -> Option<&LogicalId> {
        self.load_balancer.as_ref()
    }

    /// Subnets the workload is placed in.
    #[must_use]
    pub fn placement(&self) -> &[LogicalId] {
        &self.placement
    }

    /// Named inbound rules the topology declared.
    #[must_use]
    pub fn ingress(&self) -> &[IngressPolicy] {
        &self.ingress
    }

    /// Physical cluster name as a template value.
    #[must_use]
    pub fn cluster_name(&self) -> Value {
        intrinsic::reference(&self.cluster)
    }

    /// Physical service name as a template value.
    #[must_use]
    pub fn service_name(&self) -> Value {
        intrinsic::attribute(&self.service, "Name")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_kebab_case() {
        let elastic = ComputeTopology::Elastic { desired_count: 2, cpu_units: 512, memory_mib: 1024 };
        assert_eq!(elastic.to_string(), "elastic");
        let persistent = ComputeTopology::PersistentInstance {
            min_count: 1,
            max_count: 1,
            subnet_kind: SubnetKind::Public,
            instance_class: "t3.micro".into(),
        };
        assert_eq!(persistent.to_string(), "persistent-instance");
        assert_eq!(persistent.subnet_kind(), SubnetKind::Public);
        assert_eq!(elastic.subnet_kind(), SubnetKind::PrivateWithEgress);
    }

    #[test]
    fn instance_url_reads_the_elastic_ip() {
        let endpoint =
            ServiceEndpoint::InstancePublicAddress { address: LogicalId::new("InstanceAddress").unwrap() };
        assert_eq!(
            endpoint.url(),
            json!({ "Fn::Join": ["", ["http://", { "Fn::GetAtt": ["InstanceAddress", "PublicIp"] }, ":8108"]] })
        );
    }

    #[test]
    fn load_balancer_url_has_no_port() {
        let endpoint =
            ServiceEndpoint::LoadBalancerDns { load_balancer: LogicalId::new("LoadBalancer").unwrap() };
        assert_eq!(
            endpoint.url(),
            json!({ "Fn::Join": ["", ["http://", { "Fn::GetAtt": ["LoadBalancer", "DNSName"] }, ""]] })
        );
    }
}
