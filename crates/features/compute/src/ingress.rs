use sdeck_domain::constants::{LISTENER_PORT, SERVICE_PORT};
use serde::Serialize;
use strum_macros::Display;

/// Where inbound traffic of a policy may come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum IngressSource {
    /// Every IPv4 address, `0.0.0.0/0`.
    AnyIpv4,
    /// Only the load balancer's security group.
    LoadBalancer,
}

/// A named inbound rule. Every opening in a security group is one of these constants,
/// so the plan summary and the logs can list exactly what is exposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IngressPolicy {
    /// Logical name, also the stem of the rule's logical id.
    pub name: &'static str,
    pub description: &'static str,
    pub port: u16,
    pub source: IngressSource,
}

impl IngressPolicy {
    /// Search API reachable from anywhere. Non-production only.
    pub const PUBLIC_SEARCH_API: Self = Self {
        name: "PublicSearchApi",
        description: "Search API on the instance, open to any IPv4 source (non-production)",
        port: SERVICE_PORT,
        source: IngressSource::AnyIpv4,
    };

    /// HTTP listener of the public load balancer.
    pub const PUBLIC_HTTP_LISTENER: Self = Self {
        name: "PublicHttpListener",
        description: "HTTP listener of the public load balancer",
        port: LISTENER_PORT,
        source: IngressSource::AnyIpv4,
    };

    /// Tasks accept the search port from the load balancer only.
    pub const LOAD_BALANCER_TO_SERVICE: Self = Self {
        name: "LoadBalancerToService",
        description: "Search API on the tasks, reachable from the load balancer only",
        port: SERVICE_PORT,
        source: IngressSource::LoadBalancer,
    };

    #[must_use]
    pub const fn is_public(&self) -> bool {
        matches!(self.source, IngressSource::AnyIpv4)
    }
}
