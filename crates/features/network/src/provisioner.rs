use crate::{NetworkError, NetworkPlan};
use sdeck_domain::Naming;
use sdeck_domain::constants::ANY_IPV4;
use sdeck_kernel::graph::{LogicalId, Resource, ResourceGraph, ResourceKind, intrinsic, tag};
use serde_json::json;
use strum_macros::{Display, IntoStaticStr};
use tracing::info;

/// Subnet tier a workload is placed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
pub enum SubnetKind {
    /// Routed straight to the internet gateway, instances get public addresses.
    Public,
    /// No public addresses, outbound traffic leaves through the NAT gateway.
    PrivateWithEgress,
}

/// Read-only view of the declared network, shared by the compute layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkHandle {
    vpc: LogicalId,
    gateway_attachment: LogicalId,
    public_subnets: Vec<LogicalId>,
    private_subnets: Vec<LogicalId>,
    nat_gateway: Option<LogicalId>,
    plan: NetworkPlan,
}

impl NetworkHandle {
    #[must_use]
    pub const fn vpc(&self) -> &LogicalId {
        &self.vpc
    }

    /// Internet gateway attachment. Public addresses need it before they can be associated.
    #[must_use]
    pub const fn gateway_attachment(&self) -> &LogicalId {
        &self.gateway_attachment
    }

    /// Subnets of one tier, in zone order. Empty when the tier does not exist.
    #[must_use]
    pub fn subnets(&self, kind: SubnetKind) -> &[LogicalId] {
        match kind {
            SubnetKind::Public => &self.public_subnets,
            SubnetKind::PrivateWithEgress => &self.private_subnets,
        }
    }

    #[must_use]
    pub const fn nat_gateway(&self) -> Option<&LogicalId> {
        self.nat_gateway.as_ref()
    }

    #[must_use]
    pub const fn plan(&self) -> &NetworkPlan {
        &self.plan
    }
}

/// Declares the network resources of a [`NetworkPlan`].
#[derive(Debug, Clone)]
pub struct NetworkProvisioner {
    naming: Naming,
}

impl NetworkProvisioner {
    #[must_use]
    pub const fn new(naming: Naming) -> Self {
        Self { naming }
    }

    /// Adds the VPC, internet gateway, public subnets and, when planned, the NAT gateway with
    /// its private-with-egress subnets.
    ///
    /// # Errors
    /// Returns [`NetworkError::Graph`] if a logical id is already taken.
    pub fn provision(
        &self,
        graph: &mut ResourceGraph,
        plan: &NetworkPlan,
    ) -> Result<NetworkHandle, NetworkError> {
        let vpc = graph.add(
            id("Vpc")?,
            Resource::new(ResourceKind::Vpc)
                .property("CidrBlock", plan.vpc.to_string())
                .property("EnableDnsHostnames", true)
                .property("EnableDnsSupport", true)
                .property("Tags", json!([tag("Name", self.naming.physical("vpc"))])),
        )?;

        let igw = graph.add(id("InternetGateway")?, Resource::new(ResourceKind::InternetGateway))?;
        let attachment = graph.add(
            id("GatewayAttachment")?,
            Resource::new(ResourceKind::GatewayAttachment)
                .property("VpcId", intrinsic::reference(&vpc))
                .property("InternetGatewayId", intrinsic::reference(&igw)),
        )?;

        let public_routes = graph.add(
            id("PublicRouteTable")?,
            Resource::new(ResourceKind::RouteTable).property("VpcId", intrinsic::reference(&vpc)),
        )?;
        graph.add(
            id("PublicDefaultRoute")?,
            Resource::new(ResourceKind::Route)
                .property("RouteTableId", intrinsic::reference(&public_routes))
                .property("DestinationCidrBlock", ANY_IPV4)
                .property("GatewayId", intrinsic::reference(&igw))
                .depends_on(&attachment),
        )?;

        let mut public_subnets = Vec::with_capacity(plan.zones.len());
        for zone in &plan.zones {
            let subnet = self.subnet(graph, &vpc, "PublicSubnet", zone.index, zone.public, true)?;
            associate(graph, &subnet, &public_routes)?;
            public_subnets.push(subnet);
        }

        let mut private_subnets = Vec::new();
        let mut nat_gateway = None;
        if plan.nat_gateway {
            let Some(first_public) = public_subnets.first() else {
                return Err("NAT gateway planned without a public subnet".into());
            };

            let eip = graph.add(
                id("NatElasticIp")?,
                Resource::new(ResourceKind::ElasticIp)
                    .property("Domain", "vpc")
                    .depends_on(&attachment),
            )?;
            let nat = graph.add(
                id("NatGateway")?,
                Resource::new(ResourceKind::NatGateway)
                    .property("AllocationId", intrinsic::attribute(&eip, "AllocationId"))
                    .property("SubnetId", intrinsic::reference(first_public))
                    .property("Tags", json!([tag("Name", self.naming.physical("nat"))])),
            )?;

            let private_routes = graph.add(
                id("PrivateRouteTable")?,
                Resource::new(ResourceKind::RouteTable)
                    .property("VpcId", intrinsic::reference(&vpc)),
            )?;
            graph.add(
                id("PrivateDefaultRoute")?,
                Resource::new(ResourceKind::Route)
                    .property("RouteTableId", intrinsic::reference(&private_routes))
                    .property("DestinationCidrBlock", ANY_IPV4)
                    .property("NatGatewayId", intrinsic::reference(&nat)),
            )?;

            for zone in &plan.zones {
                let Some(block) = zone.private else {
                    return Err(format!("zone {} has no private block", zone.index).into());
                };
                let subnet = self.subnet(graph, &vpc, "PrivateSubnet", zone.index, block, false)?;
                associate(graph, &subnet, &private_routes)?;
                private_subnets.push(subnet);
            }
            nat_gateway = Some(nat);
        }

        info!(
            vpc = %plan.vpc,
            zones = plan.zones.len(),
            nat_gateway = plan.nat_gateway,
            "Network declared"
        );

        Ok(NetworkHandle {
            vpc,
            gateway_attachment: attachment,
            public_subnets,
            private_subnets,
            nat_gateway,
            plan: plan.clone(),
        })
    }

    fn subnet(
        &self,
        graph: &mut ResourceGraph,
        vpc: &LogicalId,
        base: &'static str,
        zone: usize,
        block: crate::Ipv4Cidr,
        public: bool,
    ) -> Result<LogicalId, NetworkError> {
        let tier = if public { "public" } else { "private" };
        let subnet_id = id(base)?.indexed(zone + 1)?;
        Ok(graph.add(
            subnet_id,
            Resource::new(ResourceKind::Subnet)
                .property("VpcId", intrinsic::reference(vpc))
                .property("CidrBlock", block.to_string())
                .property("AvailabilityZone", intrinsic::select(zone, intrinsic::availability_zones()))
                .property("MapPublicIpOnLaunch", public)
                .property(
                    "Tags",
                    json!([
                        tag("Name", self.naming.physical(&format!("{tier}-{}", zone + 1))),
                        tag("subnet-type", tier),
                    ]),
                ),
        )?)
    }
}

fn associate(
    graph: &mut ResourceGraph,
    subnet: &LogicalId,
    routes: &LogicalId,
) -> Result<(), NetworkError> {
    graph.add(
        LogicalId::new(format!("{subnet}RouteTableAssociation"))?,
        Resource::new(ResourceKind::SubnetRouteTableAssociation)
            .property("SubnetId", intrinsic::reference(subnet))
            .property("RouteTableId", intrinsic::reference(routes)),
    )?;
    Ok(())
}

fn id(raw: &'static str) -> Result<LogicalId, NetworkError> {
    Ok(LogicalId::new(raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdeck_domain::Environment;
    use sdeck_domain::config::NetworkConfig;

    fn provision(environment: Environment) -> (ResourceGraph, NetworkHandle) {
        let plan = NetworkPlan::new(&NetworkConfig::default(), environment).unwrap();
        let mut graph = ResourceGraph::new("network");
        let handle = NetworkProvisioner::new(Naming::new("typesense", environment))
            .provision(&mut graph, &plan)
            .unwrap();
        (graph, handle)
    }

    #[test]
    fn dev_network_is_public_only() {
        let (graph, handle) = provision(Environment::Dev);
        assert_eq!(handle.subnets(SubnetKind::Public).len(), 2);
        assert!(handle.subnets(SubnetKind::PrivateWithEgress).is_empty());
        assert!(handle.nat_gateway().is_none());
        assert_eq!(graph.of_kind(ResourceKind::NatGateway).count(), 0);
        graph.validate().unwrap();
    }

    #[test]
    fn prod_network_routes_private_tier_through_nat() {
        let (graph, handle) = provision(Environment::Prod);
        let nat = handle.nat_gateway().unwrap();
        assert_eq!(handle.subnets(SubnetKind::PrivateWithEgress).len(), 2);

        let route = graph.get(&LogicalId::new("PrivateDefaultRoute").unwrap()).unwrap();
        assert_eq!(route.get("NatGatewayId"), Some(&intrinsic::reference(nat)));

        for subnet in handle.subnets(SubnetKind::PrivateWithEgress) {
            let resource = graph.get(subnet).unwrap();
            assert_eq!(resource.get("MapPublicIpOnLaunch"), Some(&json!(false)));
        }
        graph.validate().unwrap();
    }

    #[test]
    fn provisioning_twice_into_one_graph_is_rejected() {
        let plan = NetworkPlan::new(&NetworkConfig::default(), Environment::Dev).unwrap();
        let provisioner = NetworkProvisioner::new(Naming::new("typesense", Environment::Dev));
        let mut graph = ResourceGraph::new("network");
        provisioner.provision(&mut graph, &plan).unwrap();

        let err = provisioner.provision(&mut graph, &plan).unwrap_err();
        assert!(matches!(err, NetworkError::Graph { source: sdeck_kernel::graph::GraphError::Duplicate { .. }, .. }));
    }

    #[test]
    fn subnet_kind_labels() {
        assert_eq!(SubnetKind::PrivateWithEgress.to_string(), "private-with-egress");
        assert_eq!(SubnetKind::Public.to_string(), "public");
    }
}
