//! Declarative resource graph.
//!
//! Feature crates add resources under template-unique [`LogicalId`]s; references between them
//! are written with the [`intrinsic`] helpers and double as dependency edges. The graph is a
//! target state: building it twice from the same input yields equal graphs, and adding the
//! same logical id twice is rejected instead of producing a duplicate resource.

mod error;
mod id;
pub mod intrinsic;
mod kind;
mod resource;

pub use error::{GraphError, GraphErrorExt};
pub use id::LogicalId;
pub use kind::{ResourceKind, TagStyle};
pub use resource::Resource;

use serde_json::{Map, Value, json};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

const TEMPLATE_FORMAT_VERSION: &str = "2010-09-09";

/// A named value published by the rendered template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    pub value: Value,
    pub description: Option<String>,
    /// Cross-stack export name, if the value should be importable elsewhere.
    pub export_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceGraph {
    description: String,
    resources: BTreeMap<LogicalId, Resource>,
    outputs: BTreeMap<LogicalId, Output>,
    tags: BTreeMap<String, String>,
}

impl ResourceGraph {
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            resources: BTreeMap::new(),
            outputs: BTreeMap::new(),
            tags: BTreeMap::new(),
        }
    }

    /// Adds a tag applied to every taggable resource when rendering.
    /// Tags a resource sets itself take precedence.
    pub fn tag(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.tags.insert(key.into(), value.into());
    }

    /// Registers a resource and hands its id back for wiring.
    ///
    /// # Errors
    /// Returns [`GraphError::Duplicate`] if the id is already taken.
    pub fn add(&mut self, id: LogicalId, resource: Resource) -> Result<LogicalId, GraphError> {
        if self.resources.contains_key(&id) {
            return Err(GraphError::Duplicate {
                message: format!("resource '{id}' is already declared").into(),
                context: Some(resource.kind().type_name().into()),
            });
        }
        debug!(id = %id, kind = resource.kind().type_name(), "Adding resource");
        self.resources.insert(id.clone(), resource);
        Ok(id)
    }

    /// # Errors
    /// Returns [`GraphError::Duplicate`] if an output with this id exists.
    pub fn add_output(&mut self, id: LogicalId, output: Output) -> Result<(), GraphError> {
        if self.outputs.contains_key(&id) {
            return Err(GraphError::Duplicate {
                message: format!("output '{id}' is already declared").into(),
                context: None,
            });
        }
        self.outputs.insert(id, output);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, id: &LogicalId) -> Option<&Resource> {
        self.resources.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.resources.keys().any(|k| k.as_str() == id)
    }

    pub fn resources(&self) -> impl Iterator<Item = (&LogicalId, &Resource)> {
        self.resources.iter()
    }

    /// Resources of one kind, in logical id order.
    pub fn of_kind(&self, kind: ResourceKind) -> impl Iterator<Item = (&LogicalId, &Resource)> {
        self.resources.iter().filter(move |(_, r)| r.kind() == kind)
    }

    pub fn outputs(&self) -> impl Iterator<Item = (&LogicalId, &Output)> {
        self.outputs.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Checks that every reference resolves, that every attribute read exists on its target's
    /// type and that dependencies are acyclic.
    ///
    /// # Errors
    /// [`GraphError::DanglingReference`], [`GraphError::UnknownAttribute`] or
    /// [`GraphError::Cycle`].
    pub fn validate(&self) -> Result<(), GraphError> {
        self.topological_order()?;
        self.check_attributes()
    }

    fn check_attributes(&self) -> Result<(), GraphError> {
        let by_name: BTreeMap<&str, &Resource> =
            self.resources.iter().map(|(id, r)| (id.as_str(), r)).collect();
        let resource_values = self
            .resources
            .iter()
            .flat_map(|(id, r)| r.properties().values().map(move |v| (id, v)));
        let output_values = self.outputs.iter().map(|(id, o)| (id, &o.value));

        for (owner, value) in resource_values.chain(output_values) {
            for (target, attribute) in intrinsic::attribute_reads(value) {
                // Unknown targets are reported by the ordering pass.
                let Some(resource) = by_name.get(target.as_str()) else {
                    continue;
                };
                if !resource.kind().attributes().contains(&attribute.as_str()) {
                    return Err(GraphError::UnknownAttribute {
                        message: format!(
                            "'{owner}' reads '{attribute}' of '{target}', which {} does not expose",
                            resource.kind()
                        )
                        .into(),
                        context: None,
                    });
                }
            }
        }
        Ok(())
    }

    /// Resources ordered so that every resource follows its dependencies.
    /// Ties are broken by logical id, so the order is stable across runs.
    ///
    /// # Errors
    /// [`GraphError::DanglingReference`] or [`GraphError::Cycle`].
    pub fn topological_order(&self) -> Result<Vec<&LogicalId>, GraphError> {
        let by_name: BTreeMap<&str, &LogicalId> =
            self.resources.keys().map(|id| (id.as_str(), id)).collect();

        let mut pending: BTreeMap<&LogicalId, BTreeSet<&LogicalId>> = BTreeMap::new();
        for (id, resource) in &self.resources {
            let mut deps = BTreeSet::new();
            for dep in resource.dependencies() {
                let Some(target) = by_name.get(dep.as_str()) else {
                    return Err(GraphError::DanglingReference {
                        message: format!("'{id}' references unknown resource '{dep}'").into(),
                        context: None,
                    });
                };
                if *target == id {
                    return Err(GraphError::Cycle {
                        message: format!("'{id}' references itself").into(),
                        context: None,
                    });
                }
                deps.insert(*target);
            }
            pending.insert(id, deps);
        }

        for (id, output) in &self.outputs {
            if let Some(dep) =
                intrinsic::references(&output.value).into_iter().find(|d| !by_name.contains_key(d.as_str()))
            {
                return Err(GraphError::DanglingReference {
                    message: format!("output '{id}' references unknown resource '{dep}'").into(),
                    context: None,
                });
            }
        }

        let mut order = Vec::with_capacity(pending.len());
        let mut placed = BTreeSet::new();
        while !pending.is_empty() {
            let ready: Vec<&LogicalId> = pending
                .iter()
                .filter(|(_, deps)| deps.iter().all(|d| placed.contains(*d)))
                .map(|(id, _)| *id)
                .collect();

            if ready.is_empty() {
                let stuck: Vec<&str> = pending.keys().map(|id| id.as_str()).collect();
                return Err(GraphError::Cycle {
                    message: format!("unresolvable dependencies between {}", stuck.join(", ")).into(),
                    context: None,
                });
            }

            for id in ready {
                pending.remove(id);
                placed.insert(id);
                order.push(id);
            }
        }

        Ok(order)
    }

    /// Renders the validated graph into a template document.
    ///
    /// # Errors
    /// Any validation error, see [`ResourceGraph::validate`].
    pub fn render(&self) -> Result<Value, GraphError> {
        let order = self.topological_order()?;
        self.check_attributes()?;

        let mut resources = Map::new();
        for id in order {
            let Some(resource) = self.resources.get(id) else {
                return Err(format!("ordered resource '{id}' vanished from the graph").into());
            };
            resources.insert(id.to_string(), self.render_resource(resource));
        }

        let outputs: Map<String, Value> = self
            .outputs
            .iter()
            .map(|(id, output)| {
                let mut body = Map::new();
                if let Some(description) = &output.description {
                    body.insert("Description".into(), json!(description));
                }
                body.insert("Value".into(), output.value.clone());
                if let Some(name) = &output.export_name {
                    body.insert("Export".into(), json!({ "Name": name }));
                }
                (id.to_string(), Value::Object(body))
            })
            .collect();

        Ok(json!({
            "AWSTemplateFormatVersion": TEMPLATE_FORMAT_VERSION,
            "Description": self.description,
            "Resources": resources,
            "Outputs": outputs,
        }))
    }

    /// [`ResourceGraph::render`] as pretty-printed JSON.
    ///
    /// # Errors
    /// Validation errors, or [`GraphError::Serialization`].
    pub fn to_json_pretty(&self) -> Result<String, GraphError> {
        serde_json::to_string_pretty(&self.render()?).context("Rendering template")
    }

    fn render_resource(&self, resource: &Resource) -> Value {
        let mut properties = resource.properties().clone();
        self.apply_tags(resource.kind().tag_style(), &mut properties);

        let mut body = Map::new();
        body.insert("Type".into(), json!(resource.kind().type_name()));
        if !resource.explicit_dependencies().is_empty() {
            body.insert("DependsOn".into(), json!(resource.explicit_dependencies()));
        }
        if !properties.is_empty() {
            body.insert("Properties".into(), Value::Object(properties));
        }
        Value::Object(body)
    }

    fn apply_tags(&self, style: TagStyle, properties: &mut Map<String, Value>) {
        if self.tags.is_empty() || style == TagStyle::Untagged {
            return;
        }

        let entry = properties.entry("Tags").or_insert_with(|| Value::Array(Vec::new()));
        let Value::Array(tags) = entry else {
            return;
        };

        let present: BTreeSet<String> = tags
            .iter()
            .filter_map(|t| t.get("Key").and_then(Value::as_str).map(str::to_owned))
            .collect();

        for (key, value) in self.tags.iter().filter(|(k, _)| !present.contains(*k)) {
            tags.push(match style {
                TagStyle::Propagating => {
                    json!({ "Key": key, "Value": value, "PropagateAtLaunch": true })
                }
                _ => json!({ "Key": key, "Value": value }),
            });
        }
    }
}

/// `[{Key, Value}]` entry for resources that set their own tags, such as `Name`.
#[must_use]
pub fn tag(key: &str, value: impl Into<Value>) -> Value {
    json!({ "Key": key, "Value": value.into() })
}
