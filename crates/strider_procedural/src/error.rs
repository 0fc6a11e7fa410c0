//! # Procedural Error Types
//!
//! Generation itself never fails. These errors come from building rule tables
//! and loading configuration.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while preparing generation.
#[derive(Error, Debug)]
pub enum ProceduralError {
    /// A rule is malformed (non-uppercase lhs, empty rhs).
    #[error("invalid rule {lhs} -> {rhs:?}: {reason}")]
    InvalidRule {
        /// Left-hand side of the offending rule.
        lhs: char,
        /// Right-hand side of the offending rule.
        rhs: String,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// A rule weight is negative or not finite.
    #[error("invalid weight {weight} on rule {lhs} -> {rhs:?}")]
    InvalidWeight {
        /// Left-hand side of the offending rule.
        lhs: char,
        /// Right-hand side of the offending rule.
        rhs: String,
        /// The rejected weight.
        weight: f32,
    },

    /// No rule rewrites the start symbol.
    #[error("no rule rewrites the start symbol {0}")]
    MissingStartSymbol(char),

    /// A right-hand side references a non-terminal with no rules.
    #[error("symbol {symbol} used in a rule for {lhs} has no rules of its own")]
    UndefinedNonTerminal {
        /// The undefined symbol.
        symbol: char,
        /// The rule whose right-hand side references it.
        lhs: char,
    },

    /// A non-terminal can keep rewriting without emitting a terminal.
    #[error("symbol {symbol} can rewrite forever without emitting a terminal")]
    UnproductiveSymbol {
        /// First symbol found on the silent cycle.
        symbol: char,
    },

    /// A chunk was configured to hold no sections.
    #[error("chunk length must be at least 1")]
    InvalidChunkLength,

    /// Configuration file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid TOML for the expected schema.
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Result type for procedural operations.
pub type ProceduralResult<T> = Result<T, ProceduralError>;
