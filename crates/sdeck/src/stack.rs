use crate::error::{StackError, StackErrorExt};
use crate::plan::PlanSummary;
use sdeck_compute::{ResolvedTopology, TopologyResolver};
use sdeck_domain::config::StackConfig;
use sdeck_domain::{Environment, Naming};
use sdeck_kernel::config::validate;
use sdeck_kernel::graph::ResourceGraph;
use sdeck_network::{NetworkHandle, NetworkPlan, NetworkProvisioner};
use sdeck_outputs::{OutputSet, emit};
use sdeck_secrets::{CredentialHandle, SecretProvisioner};
use std::str::FromStr;
use tracing::{debug, info};

/// Tag naming the tool on every taggable resource.
pub const MANAGED_BY: &str = "sdeck";

/// Parses an environment tag, case-insensitively.
///
/// # Errors
/// [`StackError::InvalidEnvironment`] for anything outside `dev`, `stage`, `prod`.
pub fn parse_environment(raw: &str) -> Result<Environment, StackError> {
    Environment::from_str(raw.trim()).map_err(|_| StackError::InvalidEnvironment {
        message: format!("'{raw}' is not one of dev, stage, prod").into(),
        context: None,
    })
}

/// A validated stack instance: one configuration bound to one environment.
///
/// Construction performs every configuration check, so a [`Stack`] that exists can only fail
/// to synthesize for provisioning reasons.
#[derive(Debug, Clone)]
pub struct Stack {
    config: StackConfig,
    environment: Environment,
    naming: Naming,
    network_plan: NetworkPlan,
}

impl Stack {
    /// # Errors
    /// [`StackError::Config`] or [`StackError::Network`] (configuration class) for invalid values.
    pub fn new(config: StackConfig, environment: Environment) -> Result<Self, StackError> {
        validate(&config, environment).context("Validating stack configuration")?;
        let network_plan =
            NetworkPlan::new(&config.network, environment).context("Planning network")?;
        let naming = Naming::new(&config.stack.name, environment);

        debug!(stack = naming.prefix(), zones = network_plan.zones.len(), "Stack configured");
        Ok(Self { config, environment, naming, network_plan })
    }

    #[must_use]
    pub const fn environment(&self) -> Environment {
        self.environment
    }

    #[must_use]
    pub const fn config(&self) -> &StackConfig {
        &self.config
    }

    #[must_use]
    pub const fn naming(&self) -> &Naming {
        &self.naming
    }

    /// Runs the whole pipeline: credential and network first, then exactly one compute
    /// topology wired to both, then the outputs of that topology.
    ///
    /// Synthesis is a pure function of the configuration and environment: running it twice
    /// yields equal graphs.
    ///
    /// # Errors
    /// Any provisioning failure. Nothing is retried and the partial graph is dropped.
    pub fn synthesize(&self) -> Result<SynthesizedStack, StackError> {
        let mut graph = ResourceGraph::new(format!(
            "Typesense search service {} ({})",
            self.naming.prefix(),
            self.environment
        ));
        graph.tag("sdeck:stack", self.config.stack.name.as_str());
        graph.tag("sdeck:environment", self.environment.as_ref());
        graph.tag("sdeck:managed-by", MANAGED_BY);
        for (key, value) in &self.config.stack.tags {
            graph.tag(key.as_str(), value.as_str());
        }

        let credential = SecretProvisioner::new(self.naming.clone(), &self.config.secrets)
            .provision(&mut graph)?;
        let network =
            NetworkProvisioner::new(self.naming.clone()).provision(&mut graph, &self.network_plan)?;

        let topology = TopologyResolver::new(&self.config, self.environment)
            .resolve(&network, &credential, &mut graph)?;

        let outputs = emit(self.environment, &topology, &credential)?;
        outputs.publish(&mut graph, &self.naming)?;

        graph.validate().context("Validating synthesized graph")?;
        info!(
            stack = self.naming.prefix(),
            topology = %topology.topology(),
            resources = graph.len(),
            outputs = outputs.len(),
            "Stack synthesized"
        );

        Ok(SynthesizedStack {
            environment: self.environment,
            naming: self.naming.clone(),
            network,
            credential,
            topology,
            graph,
            outputs,
        })
    }
}

/// Result of [`Stack::synthesize`]: the target state and the outputs it publishes.
#[derive(Debug, Clone)]
pub struct SynthesizedStack {
    pub environment: Environment,
    pub naming: Naming,
    pub network: NetworkHandle,
    pub credential: CredentialHandle,
    pub topology: ResolvedTopology,
    pub graph: ResourceGraph,
    pub outputs: OutputSet,
}

impl SynthesizedStack {
    /// Human-oriented summary for review before deployment.
    #[must_use]
    pub fn plan(&self) -> PlanSummary {
        PlanSummary::from_stack(self)
    }

    /// The rendered template as pretty JSON.
    ///
    /// # Errors
    /// [`StackError::Graph`] if rendering fails.
    pub fn to_json_pretty(&self) -> Result<String, StackError> {
        Ok(self.graph.to_json_pretty()?)
    }
}
