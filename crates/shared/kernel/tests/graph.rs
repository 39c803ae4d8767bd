use proptest::prelude::*;
use sdeck_kernel::graph::{LogicalId, Resource, ResourceGraph, ResourceKind, intrinsic};

/// Builds a chain of subnets where each one references the previous.
fn chain(len: usize) -> ResourceGraph {
    let mut graph = ResourceGraph::new("chain");
    let base = LogicalId::new("Node").unwrap();
    let mut previous: Option<LogicalId> = None;
    for i in 0..len {
        let mut resource = Resource::new(ResourceKind::Subnet);
        if let Some(prev) = &previous {
            resource = resource.property("Parent", intrinsic::reference(prev));
        }
        previous = Some(graph.add(base.indexed(i).unwrap(), resource).unwrap());
    }
    graph
}

proptest! {
    #[test]
    fn rendering_is_deterministic(len in 1usize..40) {
        let a = chain(len).render().unwrap();
        let b = chain(len).render().unwrap();
        prop_assert_eq!(serde_json::to_string(&a).unwrap(), serde_json::to_string(&b).unwrap());
    }

    #[test]
    fn order_respects_references(len in 1usize..40) {
        let graph = chain(len);
        let order = graph.topological_order().unwrap();
        prop_assert_eq!(order.len(), len);
        for (position, id) in order.iter().enumerate() {
            prop_assert_eq!(id.as_str(), format!("Node{position}"));
        }
    }
}

#[test]
fn rendered_resources_follow_dependency_order() {
    let doc = chain(3).render().unwrap();
    let keys: Vec<_> = doc["Resources"].as_object().unwrap().keys().cloned().collect();
    assert_eq!(keys, ["Node0", "Node1", "Node2"]);
}
