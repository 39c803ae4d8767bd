use sdeck_derive::stack_error;
use std::borrow::Cow;

#[stack_error]
pub enum DemoError {
    #[error("IO error{}: {source}", format_context(.context))]
    Io {
        #[source]
        source: std::io::Error,
        context: Option<Cow<'static, str>>,
    },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn read() -> Result<(), DemoError> {
    Err::<(), _>(std::io::Error::other("disk gone")).context("Reading state")
}

fn main() {
    let err = read().unwrap_err();
    assert_eq!(err.variant(), "Io");
    assert_eq!(err.to_string(), "IO error (Reading state): disk gone");

    let internal: DemoError = "boom".into();
    assert_eq!(internal.variant(), "Internal");
    assert_eq!(internal.to_string(), "Internal error: boom");
}
