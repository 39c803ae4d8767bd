use sdeck_kernel::graph::GraphError;
use std::borrow::Cow;

/// A specialized [`SecretError`] enum of this crate.
#[sdeck_derive::stack_error]
pub enum SecretError {
    #[error("Resource graph error{}: {source}", format_context(.context))]
    Graph { source: GraphError, context: Option<Cow<'static, str>> },

    #[error("Internal secret error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
