// ABOUTME: Validated repository identifier in namespace/name form.
// ABOUTME: A bare name falls back to the account namespace.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepositoryNameError {
    #[error("repository name cannot be empty")]
    Empty,

    #[error("repository name must be `namespace/name`, got: {0}")]
    InvalidFormat(String),

    #[error("repository name must be lowercase")]
    NotLowercase,

    #[error("invalid character in repository name: '{0}'")]
    InvalidChar(char),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryName {
    namespace: String,
    name: String,
}

impl RepositoryName {
    /// Parse a fully qualified `namespace/name` identifier.
    pub fn parse(input: &str) -> Result<Self, RepositoryNameError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(RepositoryNameError::Empty);
        }

        match input.split_once('/') {
            Some((namespace, name)) if !name.contains('/') => {
                validate_component(namespace, input)?;
                validate_component(name, input)?;
                Ok(Self {
                    namespace: namespace.to_string(),
                    name: name.to_string(),
                })
            }
            _ => Err(RepositoryNameError::InvalidFormat(input.to_string())),
        }
    }

    /// Parse `namespace/name`, or a bare `name` placed under `default_namespace`.
    pub fn with_default_namespace(
        input: &str,
        default_namespace: &str,
    ) -> Result<Self, RepositoryNameError> {
        let input = input.trim();
        if input.contains('/') {
            return Self::parse(input);
        }
        Self::parse(&format!("{}/{}", default_namespace.trim(), input))
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

fn validate_component(component: &str, whole: &str) -> Result<(), RepositoryNameError> {
    if component.is_empty() {
        return Err(RepositoryNameError::InvalidFormat(whole.to_string()));
    }

    for c in component.chars() {
        if c.is_ascii_uppercase() {
            return Err(RepositoryNameError::NotLowercase);
        }
        if !c.is_ascii_lowercase() && !c.is_ascii_digit() && !matches!(c, '-' | '_' | '.') {
            return Err(RepositoryNameError::InvalidChar(c));
        }
    }

    Ok(())
}

impl fmt::Display for RepositoryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}
