use std::borrow::Cow;

/// Failures while assembling, validating or rendering a resource graph.
#[sdeck_derive::stack_error]
pub enum GraphError {
    /// A logical id is empty or contains characters the template format rejects.
    #[error("Invalid logical id{}: {message}", format_context(.context))]
    InvalidId { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A resource or output with the same logical id is already registered.
    #[error("Duplicate logical id{}: {message}", format_context(.context))]
    Duplicate { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A property, output or explicit dependency names a resource that does not exist.
    #[error("Dangling reference{}: {message}", format_context(.context))]
    DanglingReference { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// `Fn::GetAtt` reads an attribute the target's type does not expose.
    #[error("Unknown attribute{}: {message}", format_context(.context))]
    UnknownAttribute { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Dependency cycle{}: {message}", format_context(.context))]
    Cycle { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Template serialization error{}: {source}", format_context(.context))]
    Serialization { source: serde_json::Error, context: Option<Cow<'static, str>> },

    #[error("Internal graph error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
