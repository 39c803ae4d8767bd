//! Kernel utilities shared across slices.
//! Keep this crate free of cloud or topology knowledge; it provides config loading and the
//! resource graph every feature crate writes into.
//!
//! ## Config loading
//! ```rust,no_run
//! use sdeck_kernel::config::load_config;
//! use sdeck_kernel::domain::config::StackConfig;
//!
//! let cfg: StackConfig = load_config(None::<&str>).unwrap_or_default();
//! assert_eq!(cfg.stack.name, "typesense");
//! ```
//!
//! ## Resource graph
//! ```rust
//! use sdeck_kernel::graph::{LogicalId, Resource, ResourceGraph, ResourceKind, intrinsic};
//!
//! # fn main() -> Result<(), sdeck_kernel::graph::GraphError> {
//! let mut graph = ResourceGraph::new("demo");
//! let vpc = graph.add(LogicalId::new("Vpc")?, Resource::new(ResourceKind::Vpc))?;
//! graph.add(
//!     LogicalId::new("Subnet")?,
//!     Resource::new(ResourceKind::Subnet).property("VpcId", intrinsic::reference(&vpc)),
//! )?;
//! assert_eq!(graph.topological_order()?.len(), 2);
//! # Ok(())
//! # }
//! ```
pub mod config;
pub mod graph;

pub use sdeck_domain as domain;
