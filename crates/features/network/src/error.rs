use sdeck_kernel::graph::GraphError;
use std::borrow::Cow;

#[sdeck_derive::stack_error]
pub enum NetworkError {
    /// The configured address block is not valid CIDR notation.
    #[error("Invalid CIDR{}: {message}", format_context(.context))]
    InvalidCidr { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The address block is too small for the requested subnets.
    #[error("Insufficient address space{}: {message}", format_context(.context))]
    Capacity { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Resource graph error{}: {source}", format_context(.context))]
    Graph { source: GraphError, context: Option<Cow<'static, str>> },

    #[error("Internal network error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl NetworkError {
    /// Whether the error stems from configuration rather than graph assembly.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::InvalidCidr { .. } | Self::Capacity { .. })
    }
}
