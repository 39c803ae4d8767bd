use proptest::prelude::*;
use sdeck_domain::config::NetworkConfig;
use sdeck_domain::{Environment, Naming};
use sdeck_kernel::graph::{ResourceGraph, ResourceKind};
use sdeck_network::{NetworkPlan, NetworkProvisioner, SubnetKind};

proptest! {
    #[test]
    fn subnets_never_overlap(second in 0u8..=255, zones in 1u8..=4, prod in any::<bool>()) {
        let environment = if prod { Environment::Prod } else { Environment::Stage };
        let config = NetworkConfig { cidr: format!("10.{second}.0.0/16"), max_azs: zones };
        let plan = NetworkPlan::new(&config, environment).unwrap();

        let mut blocks: Vec<_> = plan
            .zones
            .iter()
            .flat_map(|z| std::iter::once(z.public).chain(z.private))
            .collect();
        let total = blocks.len();
        blocks.sort();
        blocks.dedup();
        prop_assert_eq!(blocks.len(), total);
        prop_assert_eq!(total, usize::from(zones) * if prod { 2 } else { 1 });
    }
}

#[test]
fn network_resources_render_with_expected_counts() {
    let plan = NetworkPlan::new(&NetworkConfig::default(), Environment::Prod).unwrap();
    let mut graph = ResourceGraph::new("layout");
    let handle = NetworkProvisioner::new(Naming::new("typesense", Environment::Prod))
        .provision(&mut graph, &plan)
        .unwrap();

    assert_eq!(graph.of_kind(ResourceKind::Subnet).count(), 4);
    assert_eq!(graph.of_kind(ResourceKind::SubnetRouteTableAssociation).count(), 4);
    assert_eq!(graph.of_kind(ResourceKind::ElasticIp).count(), 1);

    let doc = graph.render().unwrap();
    let subnet = handle.subnets(SubnetKind::PrivateWithEgress)[0].as_str();
    assert_eq!(doc["Resources"][subnet]["Properties"]["CidrBlock"], "10.0.4.0/24");
    assert_eq!(doc["Resources"]["Vpc"]["Properties"]["CidrBlock"], "10.0.0.0/16");
}
