// src/error.rs
//! Errors raised while building identifiers and paths from text.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentifierError {
    #[error("identifier is empty")]
    Empty,

    #[error("identifier '{name}' contains invalid character '{ch}'")]
    InvalidCharacter { name: String, ch: char },

    #[error("identifier '{name}' must not start with a digit")]
    LeadingDigit { name: String },

    #[error("invalid discriminator '{text}'")]
    InvalidDiscriminator { text: String },

    #[error("identifier '{name}' already has {limit} meanings registered")]
    TooManyMeanings { name: String, limit: usize },

    #[error("invalid path step '{text}'")]
    InvalidStep { text: String },
}
