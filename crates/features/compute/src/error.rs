use sdeck_kernel::graph::GraphError;
use sdeck_network::SubnetKind;
use std::borrow::Cow;

#[sdeck_derive::stack_error]
pub enum ComputeError {
    /// The network handle has no subnets of the tier the topology is placed in.
    #[error("No {kind} subnets available{}", format_context(.context))]
    MissingSubnets { kind: SubnetKind, context: Option<Cow<'static, str>> },

    #[error("Resource graph error{}: {source}", format_context(.context))]
    Graph { source: GraphError, context: Option<Cow<'static, str>> },

    #[error("Internal compute error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
