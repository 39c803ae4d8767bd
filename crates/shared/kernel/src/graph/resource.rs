use super::{LogicalId, ResourceKind, intrinsic};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// One declared resource: its type, property document and explicit ordering constraints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    kind: ResourceKind,
    properties: Map<String, Value>,
    depends_on: BTreeSet<LogicalId>,
}

impl Resource {
    #[must_use]
    pub fn new(kind: ResourceKind) -> Self {
        Self { kind, properties: Map::new(), depends_on: BTreeSet::new() }
    }

    /// Sets a property, replacing any previous value under the same name.
    #[must_use]
    pub fn property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Declares an ordering constraint that no property reference expresses.
    #[must_use]
    pub fn depends_on(mut self, id: &LogicalId) -> Self {
        self.depends_on.insert(id.clone());
        self
    }

    #[must_use]
    pub const fn kind(&self) -> ResourceKind {
        self.kind
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    #[must_use]
    pub const fn properties(&self) -> &Map<String, Value> {
        &self.properties
    }

    #[must_use]
    pub const fn explicit_dependencies(&self) -> &BTreeSet<LogicalId> {
        &self.depends_on
    }

    /// Every logical id this resource needs: explicit ones plus those its properties reference.
    #[must_use]
    pub fn dependencies(&self) -> BTreeSet<String> {
        let mut deps = BTreeSet::new();
        for value in self.properties.values() {
            deps.extend(intrinsic::references(value));
        }
        deps.extend(self.depends_on.iter().map(|id| id.as_str().to_owned()));
        deps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn dependencies_merge_explicit_and_referenced() {
        let vpc = LogicalId::new("Vpc").unwrap();
        let attach = LogicalId::new("GatewayAttachment").unwrap();
        let route = Resource::new(ResourceKind::Route)
            .property("RouteTableId", json!({ "Ref": "PublicRoutes" }))
            .property("VpcId", intrinsic::reference(&vpc))
            .depends_on(&attach);

        let deps: Vec<_> = route.dependencies().into_iter().collect();
        assert_eq!(deps, ["GatewayAttachment", "PublicRoutes", "Vpc"]);
    }

    #[test]
    fn property_overwrites() {
        let res = Resource::new(ResourceKind::Vpc).property("CidrBlock", "10.0.0.0/16").property(
            "CidrBlock",
            "10.1.0.0/16",
        );
        assert_eq!(res.get("CidrBlock"), Some(&json!("10.1.0.0/16")));
    }
}
