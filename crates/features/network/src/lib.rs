//! # Network Provisioner
//!
//! Declares an isolated network for one stack instance:
//!
//! * a VPC whose address block is split into `/24` subnets, one per availability zone and tier;
//! * an internet gateway with a default route for the **public** tier;
//! * in production only, a NAT gateway and a **private-with-egress** tier routed through it.
//!
//! Addressing is computed first as a pure [`NetworkPlan`], so a bad address block is reported
//! before anything is added to the graph. The resulting [`NetworkHandle`] is shared read-only
//! with the compute layer.

mod cidr;
mod error;
mod plan;
mod provisioner;

pub use cidr::Ipv4Cidr;
pub use error::{NetworkError, NetworkErrorExt};
pub use plan::{NetworkPlan, SUBNET_PREFIX, ZONE_SLOTS, ZonePlan};
pub use provisioner::{NetworkHandle, NetworkProvisioner, SubnetKind};
