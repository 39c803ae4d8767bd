use sdeck_kernel::graph::GraphError;
use std::borrow::Cow;

#[sdeck_derive::stack_error]
pub enum OutputError {
    /// The emitted keys differ from the contract of the environment.
    #[error("Output contract violated{}: {message}", format_context(.context))]
    Contract { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Resource graph error{}: {source}", format_context(.context))]
    Graph { source: GraphError, context: Option<Cow<'static, str>> },

    #[error("Internal output error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
