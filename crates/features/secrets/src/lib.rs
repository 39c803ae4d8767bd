//! # Secret Provisioner
//!
//! Declares the stack's single credential: a secret entry shaped `{"apiKey": "<hex>"}` whose
//! value the secret service generates on creation. The value survives stack updates and is
//! only drawn again when the secret itself is replaced.
//!
//! The resource graph receives the secret declaration and a [`CredentialHandle`] that can
//! produce references to it, never the value.
//!
//! ```rust
//! use sdeck_domain::config::SecretsConfig;
//! use sdeck_domain::{Environment, Naming};
//! use sdeck_kernel::graph::ResourceGraph;
//! use sdeck_secrets::SecretProvisioner;
//!
//! # fn main() -> Result<(), sdeck_secrets::SecretError> {
//! let config = SecretsConfig::default();
//! let mut graph = ResourceGraph::new("demo");
//! let handle = SecretProvisioner::new(Naming::new("typesense", Environment::Dev), &config)
//!     .provision(&mut graph)?;
//! assert_eq!(handle.entry(), "typesense-dev-api-key");
//! # Ok(())
//! # }
//! ```

mod error;
mod provisioner;

pub use error::{SecretError, SecretErrorExt};
pub use provisioner::{CredentialHandle, SecretProvisioner};
