use crate::Environment;

/// Physical names of a stack instance: `{stack}-{environment}-{suffix}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Naming {
    prefix: String,
}

impl Naming {
    #[must_use]
    pub fn new(stack: &str, environment: Environment) -> Self {
        Self { prefix: format!("{stack}-{environment}") }
    }

    /// The bare `{stack}-{environment}` prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    #[must_use]
    pub fn physical(&self, suffix: &str) -> String {
        format!("{}-{suffix}", self.prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_carry_stack_and_environment() {
        let naming = Naming::new("typesense", Environment::Stage);
        assert_eq!(naming.prefix(), "typesense-stage");
        assert_eq!(naming.physical("cluster"), "typesense-stage-cluster");
    }
}
