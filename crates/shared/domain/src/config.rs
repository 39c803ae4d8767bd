use crate::Environment;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

/// Top-level stack configuration.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StackConfigInner {
    pub stack: StackSection,
    pub network: NetworkConfig,
    pub service: ServiceConfig,
    pub persistent: PersistentConfig,
    pub elastic: ElasticConfig,
    pub health: HealthCheckConfig,
    pub logs: LogRetentionConfig,
    pub secrets: SecretsConfig,
}

/// Thin Arc-wrapped config for inexpensive cloning into builders.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct StackConfig {
    #[serde(flatten, default)]
    inner: Arc<StackConfigInner>,
}

impl Deref for StackConfig {
    type Target = StackConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for StackConfig {
    fn deref_mut(&mut self) -> &mut StackConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// Naming and tagging shared by every resource.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StackSection {
    /// Prefix for physical names, e.g. `typesense` yields `typesense-dev-cluster`.
    pub name: String,
    /// Extra tags applied to every taggable resource.
    pub tags: BTreeMap<String, String>,
}

/// Address space of the isolated network.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// IPv4 block in CIDR notation, at most /20 so two /24 tiers fit per zone.
    pub cidr: String,
    pub max_azs: u8,
}

/// Container image and process arguments.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub image: String,
    /// Data directory inside the container (`--data-dir`).
    pub data_dir: String,
    /// Passes `--enable-cors` to the process.
    pub enable_cors: bool,
}

/// Sizing of the single-instance topology (dev, stage).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PersistentConfig {
    pub instance_class: String,
    pub memory_reservation_mib: u32,
    /// Host directory bind-mounted as the data directory.
    pub host_data_path: String,
}

/// Sizing of the elastic topology (prod).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ElasticConfig {
    pub desired_count: u32,
    pub max_count: u32,
    pub cpu_units: u32,
    pub memory_mib: u32,
    pub cpu_target_percent: u8,
}

/// Load balancer probe policy. The probed path is fixed by the container contract.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HealthCheckConfig {
    pub interval_seconds: u32,
    pub timeout_seconds: u32,
    pub healthy_threshold: u32,
    pub unhealthy_threshold: u32,
}

/// Days to keep container logs, per environment.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogRetentionConfig {
    pub dev_days: u32,
    pub stage_days: u32,
    pub prod_days: u32,
}

impl LogRetentionConfig {
    #[must_use]
    pub const fn days_for(&self, environment: Environment) -> u32 {
        match environment {
            Environment::Dev => self.dev_days,
            Environment::Stage => self.stage_days,
            Environment::Prod => self.prod_days,
        }
    }
}

/// Generation settings of the stack credential.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SecretsConfig {
    /// Length of the generated `apiKey`, in lowercase hex characters.
    pub key_length: u32,
}

// --- Default ---

impl Default for StackSection {
    fn default() -> Self {
        Self { name: "typesense".to_owned(), tags: BTreeMap::new() }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self { cidr: "10.0.0.0/16".to_owned(), max_azs: 2 }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            image: "typesense/typesense:27.1".to_owned(),
            data_dir: "/data".to_owned(),
            enable_cors: true,
        }
    }
}

impl Default for PersistentConfig {
    fn default() -> Self {
        Self {
            instance_class: "t3.micro".to_owned(),
            memory_reservation_mib: 512,
            host_data_path: "/opt/typesense/data".to_owned(),
        }
    }
}

impl Default for ElasticConfig {
    fn default() -> Self {
        Self { desired_count: 2, max_count: 4, cpu_units: 512, memory_mib: 1024, cpu_target_percent: 70 }
    }
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self { interval_seconds: 30, timeout_seconds: 5, healthy_threshold: 2, unhealthy_threshold: 3 }
    }
}

impl Default for LogRetentionConfig {
    fn default() -> Self {
        Self { dev_days: 7, stage_days: 14, prod_days: 30 }
    }
}

impl Default for SecretsConfig {
    fn default() -> Self {
        Self { key_length: 64 }
    }
}
