//! Facade crate for `SearchDeck`.
//!
//! Composes the feature crates into one synthesis pipeline and re-exports the shared
//! primitives. Business rules live in the feature crates; this crate only orders the calls
//! and classifies failures.
//!
//! ## Usage
//! ```rust,no_run
//! use sdeck::domain::config::StackConfig;
//! use sdeck::{Stack, parse_environment};
//!
//! # fn main() -> Result<(), sdeck::StackError> {
//! let environment = parse_environment("prod")?;
//! let stack = Stack::new(StackConfig::default(), environment)?;
//! let synthesized = stack.synthesize()?;
//! println!("{}", synthesized.to_json_pretty()?);
//! # Ok(())
//! # }
//! ```

mod error;
mod plan;
mod stack;

pub use error::{ErrorClass, StackError, StackErrorExt};
pub use plan::{PlacedSubnet, PlanSummary};
pub use sdeck_domain as domain;
pub use sdeck_kernel as kernel;
pub use stack::{MANAGED_BY, Stack, SynthesizedStack, parse_environment};

/// Component crates, for callers that need their types directly.
pub mod features {
    pub use sdeck_compute as compute;
    pub use sdeck_network as network;
    pub use sdeck_outputs as outputs;
    pub use sdeck_secrets as secrets;
}
