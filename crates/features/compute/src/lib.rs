//! # Compute Topology Resolver
//!
//! Maps an [`Environment`](sdeck_domain::Environment) to exactly one [`ComputeTopology`] and
//! declares its resources against a shared network and credential:
//!
//! | environment      | topology                                   | placement            |
//! |------------------|--------------------------------------------|----------------------|
//! | `dev`, `stage`   | [`ComputeTopology::PersistentInstance`]    | public subnets       |
//! | `prod`           | [`ComputeTopology::Elastic`]               | private-with-egress  |
//!
//! [`topology_for`] is the only place the environment decides the compute shape. Both
//! builders share the cluster, the log group, the execution role and the
//! [`ContainerSpec`] of the search process; they differ in placement, exposure and scaling.
//!
//! Every security group opening is one of the named [`IngressPolicy`] constants. Openings to
//! any IPv4 source are logged at `warn` level when the topology is resolved.

mod container;
mod elastic;
mod error;
mod ingress;
mod persistent;
mod resolver;
mod topology;

pub use container::{ContainerSpec, DATA_VOLUME};
pub use error::{ComputeError, ComputeErrorExt};
pub use ingress::{IngressPolicy, IngressSource};
pub use persistent::ECS_OPTIMIZED_IMAGE;
pub use resolver::{TopologyResolver, topology_for};
pub use topology::{ComputeTopology, ResolvedTopology, ServiceEndpoint};
