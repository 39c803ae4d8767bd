use crate::SynthesizedStack;
use sdeck_compute::{ComputeTopology, IngressPolicy};
use sdeck_domain::Environment;
use sdeck_network::SubnetKind;
use sdeck_outputs::OutputKey;
use serde::Serialize;
use std::fmt;

/// One subnet the workload is placed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlacedSubnet {
    pub id: String,
    pub cidr: String,
}

/// Reviewable summary of a synthesized stack: what runs where and what is exposed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanSummary {
    pub stack: String,
    pub environment: Environment,
    pub topology: &'static str,
    pub capacity: String,
    pub subnet_kind: &'static str,
    pub placement: Vec<PlacedSubnet>,
    pub nat_gateway: bool,
    pub load_balancer: Option<String>,
    pub ingress: Vec<IngressPolicy>,
    pub outputs: Vec<&'static str>,
    pub resources: usize,
    pub credential: String,
}

impl PlanSummary {
    pub(crate) fn from_stack(stack: &SynthesizedStack) -> Self {
        let topology = stack.topology.topology();
        let kind = topology.subnet_kind();
        let plan = stack.network.plan();

        let cidrs = plan.zones.iter().filter_map(|zone| match kind {
            SubnetKind::Public => Some(zone.public),
            SubnetKind::PrivateWithEgress => zone.private,
        });
        let placement = stack
            .topology
            .placement()
            .iter()
            .zip(cidrs)
            .map(|(id, cidr)| PlacedSubnet { id: id.to_string(), cidr: cidr.to_string() })
            .collect();

        let capacity = match topology {
            ComputeTopology::PersistentInstance { max_count, instance_class, .. } => {
                format!("{max_count} x {instance_class}")
            }
            ComputeTopology::Elastic { desired_count, cpu_units, memory_mib } => {
                format!("{desired_count} tasks, {cpu_units} cpu units, {memory_mib} MiB")
            }
        };

        Self {
            stack: stack.naming.prefix().to_owned(),
            environment: stack.environment,
            topology: topology.into(),
            capacity,
            subnet_kind: kind.into(),
            placement,
            nat_gateway: plan.nat_gateway,
            load_balancer: stack.topology.load_balancer().map(ToString::to_string),
            ingress: stack.topology.ingress().to_vec(),
            outputs: stack.outputs.keys().map(OutputKey::as_wire).collect(),
            resources: stack.graph.len(),
            credential: stack.credential.entry().to_owned(),
        }
    }

    /// Policies that accept traffic from any IPv4 address.
    pub fn public_ingress(&self) -> impl Iterator<Item = &IngressPolicy> {
        self.ingress.iter().filter(|p| p.is_public())
    }
}

impl fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "stack        {}", self.stack)?;
        writeln!(f, "environment  {}", self.environment)?;
        writeln!(f, "topology     {} ({})", self.topology, self.capacity)?;
        writeln!(f, "placement    {}", self.subnet_kind)?;
        for subnet in &self.placement {
            writeln!(f, "  {:<22} {}", subnet.id, subnet.cidr)?;
        }
        writeln!(f, "nat gateway  {}", if self.nat_gateway { "yes" } else { "no" })?;
        if let Some(load_balancer) = &self.load_balancer {
            writeln!(f, "endpoint     load balancer {load_balancer}")?;
        } else {
            writeln!(f, "endpoint     instance elastic ip")?;
        }
        writeln!(f, "ingress")?;
        for policy in &self.ingress {
            let marker = if policy.is_public() { "!" } else { " " };
            writeln!(
                f,
                "{marker} {:<22} tcp/{:<5} from {:<14} {}",
                policy.name,
                policy.port,
                policy.source.to_string(),
                policy.description
            )?;
        }
        writeln!(f, "outputs      {}", self.outputs.join(", "))?;
        writeln!(f, "resources    {}", self.resources)?;
        write!(f, "credential   {}", self.credential)
    }
}
