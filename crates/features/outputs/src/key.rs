use sdeck_compute::{ComputeTopology, topology_for};
use sdeck_domain::Environment;
use sdeck_domain::config::StackConfig;
use sdeck_domain::constants::{
    OUTPUT_API_KEY_SECRET_ARN, OUTPUT_API_URL, OUTPUT_CLUSTER_NAME, OUTPUT_SERVICE_NAME,
};
use serde::Serialize;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

/// A stable output name. The string form is the contract callers depend on.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
    IntoStaticStr,
    Serialize,
)]
pub enum OutputKey {
    #[strum(serialize = "api-url")]
    #[serde(rename = "api-url")]
    ApiUrl,
    #[strum(serialize = "api-key-secret-arn")]
    #[serde(rename = "api-key-secret-arn")]
    ApiKeySecretArn,
    #[strum(serialize = "cluster-name")]
    #[serde(rename = "cluster-name")]
    ClusterName,
    #[strum(serialize = "service-name")]
    #[serde(rename = "service-name")]
    ServiceName,
}

impl OutputKey {
    /// Logical id of the template output.
    #[must_use]
    pub const fn logical_id(self) -> &'static str {
        match self {
            Self::ApiUrl => "ApiUrl",
            Self::ApiKeySecretArn => "ApiKeySecretArn",
            Self::ClusterName => "ClusterName",
            Self::ServiceName => "ServiceName",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::ApiUrl => "Base URL of the search API",
            Self::ApiKeySecretArn => "Storage reference of the API key secret",
            Self::ClusterName => "Cluster running the search service",
            Self::ServiceName => "Service running the search container",
        }
    }

    /// The wire name, identical to the `Display` form.
    #[must_use]
    pub const fn as_wire(self) -> &'static str {
        match self {
            Self::ApiUrl => OUTPUT_API_URL,
            Self::ApiKeySecretArn => OUTPUT_API_KEY_SECRET_ARN,
            Self::ClusterName => OUTPUT_CLUSTER_NAME,
            Self::ServiceName => OUTPUT_SERVICE_NAME,
        }
    }
}

/// Keys a topology publishes. The load-balanced topology has a stable endpoint and
/// omits the cluster and service names.
#[must_use]
pub fn keys_for(topology: &ComputeTopology) -> Vec<OutputKey> {
    match topology {
        ComputeTopology::PersistentInstance { .. } => vec![
            OutputKey::ApiUrl,
            OutputKey::ApiKeySecretArn,
            OutputKey::ClusterName,
            OutputKey::ServiceName,
        ],
        ComputeTopology::Elastic { .. } => vec![OutputKey::ApiUrl, OutputKey::ApiKeySecretArn],
    }
}

/// Output keys of an environment, known without provisioning anything.
///
/// Sizing never changes the topology variant, so the default configuration is enough.
#[must_use]
pub fn expected_keys(environment: Environment) -> Vec<OutputKey> {
    keys_for(&topology_for(environment, &StackConfig::default()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn wire_names_match_display() {
        for key in OutputKey::iter() {
            assert_eq!(key.to_string(), key.as_wire());
            assert_eq!(OutputKey::from_str(key.as_wire()).unwrap(), key);
            assert_eq!(serde_json::to_value(key).unwrap(), key.as_wire());
        }
    }

    #[test]
    fn contract_per_environment() {
        let full = ["api-url", "api-key-secret-arn", "cluster-name", "service-name"];
        let wire = |env| expected_keys(env).into_iter().map(OutputKey::as_wire).collect::<Vec<_>>();

        assert_eq!(wire(Environment::Dev), full);
        assert_eq!(wire(Environment::Stage), full);
        assert_eq!(wire(Environment::Prod), ["api-url", "api-key-secret-arn"]);
    }
}
