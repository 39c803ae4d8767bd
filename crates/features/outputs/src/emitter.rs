use crate::error::OutputError;
use crate::key::{OutputKey, expected_keys, keys_for};
use sdeck_compute::ResolvedTopology;
use sdeck_domain::{Environment, Naming};
use sdeck_kernel::graph::{LogicalId, Output, ResourceGraph};
use sdeck_secrets::CredentialHandle;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::info;

/// Named outputs of one stack instance, ordered by key.
///
/// Values are template expressions; the orchestrator resolves them at deploy time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct OutputSet {
    #[serde(skip)]
    environment: Environment,
    values: BTreeMap<OutputKey, Value>,
}

impl OutputSet {
    #[must_use]
    pub const fn environment(&self) -> Environment {
        self.environment
    }

    #[must_use]
    pub fn get(&self, key: OutputKey) -> Option<&Value> {
        self.values.get(&key)
    }

    #[must_use]
    pub fn contains(&self, key: OutputKey) -> bool {
        self.values.contains_key(&key)
    }

    pub fn keys(&self) -> impl Iterator<Item = OutputKey> + '_ {
        self.values.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (OutputKey, &Value)> {
        self.values.iter().map(|(k, v)| (*k, v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Adds every entry to the graph's `Outputs` section, exported as
    /// `{stack}-{environment}-{key}`.
    ///
    /// # Errors
    /// [`OutputError::Graph`] if an output id is already taken.
    pub fn publish(&self, graph: &mut ResourceGraph, naming: &Naming) -> Result<(), OutputError> {
        for (key, value) in self.iter() {
            graph.add_output(
                LogicalId::new(key.logical_id())?,
                Output {
                    value: value.clone(),
                    description: Some(key.description().to_owned()),
                    export_name: Some(naming.physical(key.as_wire())),
                },
            )?;
        }
        Ok(())
    }
}

/// Collects the outputs of whichever topology was built.
///
/// # Errors
/// [`OutputError::Contract`] if the topology's keys differ from the keys the environment
/// promises, which means the topology was not resolved for `environment`.
pub fn emit(
    environment: Environment,
    resolved: &ResolvedTopology,
    credential: &CredentialHandle,
) -> Result<OutputSet, OutputError> {
    let values: BTreeMap<OutputKey, Value> = keys_for(resolved.topology())
        .into_iter()
        .map(|key| {
            let value = match key {
                OutputKey::ApiUrl => resolved.endpoint().url(),
                OutputKey::ApiKeySecretArn => credential.arn(),
                OutputKey::ClusterName => resolved.cluster_name(),
                OutputKey::ServiceName => resolved.service_name(),
            };
            (key, value)
        })
        .collect();

    let expected = expected_keys(environment);
    if !values.keys().eq(expected.iter()) {
        return Err(OutputError::Contract {
            message: format!("{} topology cannot serve {environment}", resolved.topology()).into(),
            context: None,
        });
    }

    let set = OutputSet { environment, values };
    info!(
        environment = %environment,
        keys = ?set.keys().map(OutputKey::as_wire).collect::<Vec<_>>(),
        "Outputs emitted"
    );
    Ok(set)
}
