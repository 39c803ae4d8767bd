use super::GraphError;
use serde::{Serialize, Serializer};
use std::borrow::Cow;
use std::fmt;

const MAX_LEN: usize = 255;

/// Template-unique name of a resource or output.
///
/// ASCII alphanumeric, starting with a letter, at most 255 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LogicalId(Cow<'static, str>);

impl LogicalId {
    /// # Errors
    /// Returns [`GraphError::InvalidId`] if the name is not a valid logical id.
    pub fn new(id: impl Into<Cow<'static, str>>) -> Result<Self, GraphError> {
        let id = id.into();
        let valid = !id.is_empty()
            && id.len() <= MAX_LEN
            && id.starts_with(|c: char| c.is_ascii_alphabetic())
            && id.chars().all(|c| c.is_ascii_alphanumeric());

        if valid {
            Ok(Self(id))
        } else {
            Err(GraphError::InvalidId {
                message: format!("'{id}' must be 1-{MAX_LEN} ASCII alphanumerics starting with a letter")
                    .into(),
                context: None,
            })
        }
    }

    /// Appends an ordinal suffix, e.g. `PublicSubnet` becomes `PublicSubnet1`.
    ///
    /// # Errors
    /// Returns [`GraphError::InvalidId`] if the result grows past the length limit.
    pub fn indexed(&self, index: usize) -> Result<Self, GraphError> {
        Self::new(format!("{}{index}", self.0))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LogicalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for LogicalId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for LogicalId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_alphanumeric_ids() {
        assert_eq!(LogicalId::new("PublicSubnet1").unwrap().as_str(), "PublicSubnet1");
    }

    #[test]
    fn rejects_malformed_ids() {
        for raw in ["", "1Vpc", "api-url", "Has Space", "Ünicode"] {
            assert!(LogicalId::new(raw).is_err(), "{raw:?} should be rejected");
        }
        assert!(LogicalId::new("A".repeat(256)).is_err());
    }

    #[test]
    fn indexed_appends_ordinal() {
        let base = LogicalId::new("PrivateSubnet").unwrap();
        assert_eq!(base.indexed(2).unwrap().to_string(), "PrivateSubnet2");
    }
}
