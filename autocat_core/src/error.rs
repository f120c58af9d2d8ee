//! Error types for pond configuration.

use thiserror::Error;

/// Errors raised while building a rule set or a pond.
///
/// `Pond::step` never fails; every error here is caught at construction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A rule consumes nothing
    #[error("Reaction has no reactants (product: {product})")]
    EmptyReactants { product: String },

    /// A species name is syntactically invalid
    #[error("Invalid species name {name:?}: {reason}")]
    InvalidSpecies { name: String, reason: &'static str },

    /// A rule in a set failed validation
    #[error("Rule #{index} is invalid: {source}")]
    InvalidRule {
        index: usize,
        #[source]
        source: Box<ConfigError>,
    },

    /// A seed count below zero
    #[error("Negative initial count for {species}: {count}")]
    NegativeCount { species: String, count: i64 },

    /// Reaction notation could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),
}

impl ConfigError {
    /// Creates a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Wraps an error with the index of the rule that caused it.
    pub fn in_rule(self, index: usize) -> Self {
        Self::InvalidRule {
            index,
            source: Box::new(self),
        }
    }
}
