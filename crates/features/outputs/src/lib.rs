//! # Output Emitter
//!
//! The last step of a synthesis. Reads the built topology and the credential handle and
//! produces the [`OutputSet`], whose key set depends on the environment only:
//!
//! * `dev`, `stage`: `api-url`, `api-key-secret-arn`, `cluster-name`, `service-name`
//! * `prod`: `api-url`, `api-key-secret-arn`
//!
//! `api-key-secret-arn` is a storage reference; the credential value is never an output.

mod emitter;
mod error;
mod key;

pub use emitter::{OutputSet, emit};
pub use error::{OutputError, OutputErrorExt};
pub use key::{OutputKey, expected_keys, keys_for};
