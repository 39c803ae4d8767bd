//! # Domain Models
//!
//! Pure domain types with minimal dependencies (`serde`, `strum`).
//! Keep it lean: no I/O or heavy logic, just data and simple helpers.

pub mod config;
pub mod constants;
pub mod environment;
pub mod naming;

pub use environment::Environment;
pub use naming::Naming;
