use sdeck_compute::ComputeError;
use sdeck_kernel::config::ConfigError;
use sdeck_kernel::graph::GraphError;
use sdeck_network::NetworkError;
use sdeck_outputs::OutputError;
use sdeck_secrets::SecretError;
use std::borrow::Cow;
use strum_macros::{Display, IntoStaticStr};

/// How a failure should be treated by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum ErrorClass {
    /// Bad input. Raised before any resource is declared.
    Configuration,
    /// Graph assembly failure. Not retried.
    Provisioning,
    /// A broken internal invariant.
    Internal,
}

/// Every failure of a synthesis.
#[sdeck_derive::stack_error]
pub enum StackError {
    /// The environment tag is not one of `dev`, `stage`, `prod`.
    #[error("Invalid environment{}: {message}", format_context(.context))]
    InvalidEnvironment { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Configuration error{}: {source}", format_context(.context))]
    Config { source: ConfigError, context: Option<Cow<'static, str>> },

    #[error("Network provisioning failed{}: {source}", format_context(.context))]
    Network { source: NetworkError, context: Option<Cow<'static, str>> },

    #[error("Secret provisioning failed{}: {source}", format_context(.context))]
    Secret { source: SecretError, context: Option<Cow<'static, str>> },

    #[error("Compute provisioning failed{}: {source}", format_context(.context))]
    Compute { source: ComputeError, context: Option<Cow<'static, str>> },

    #[error("Output emission failed{}: {source}", format_context(.context))]
    Output { source: OutputError, context: Option<Cow<'static, str>> },

    #[error("Resource graph error{}: {source}", format_context(.context))]
    Graph { source: GraphError, context: Option<Cow<'static, str>> },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl StackError {
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::InvalidEnvironment { .. } | Self::Config { .. } => ErrorClass::Configuration,
            Self::Network { source, .. } if source.is_configuration() => ErrorClass::Configuration,
            Self::Network { source: NetworkError::Internal { .. }, .. }
            | Self::Secret { source: SecretError::Internal { .. }, .. }
            | Self::Compute { source: ComputeError::Internal { .. }, .. }
            | Self::Output { source: OutputError::Contract { .. } | OutputError::Internal { .. }, .. }
            | Self::Graph { source: GraphError::Internal { .. }, .. }
            | Self::Internal { .. } => ErrorClass::Internal,
            Self::Network { .. }
            | Self::Secret { .. }
            | Self::Compute { .. }
            | Self::Output { .. }
            | Self::Graph { .. } => ErrorClass::Provisioning,
        }
    }
}
