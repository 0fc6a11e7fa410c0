//! # Level Error Types

use std::path::PathBuf;

use strider_procedural::{ProceduralError, SectionType};
use thiserror::Error;

/// Errors that can occur while configuring or starting a level.
#[derive(Error, Debug)]
pub enum LevelError {
    /// The rolling window must hold at least the current and one upcoming chunk.
    #[error("chunk cache size {size} is too small (minimum 2)")]
    InvalidCacheSize {
        /// Configured size.
        size: usize,
    },

    /// Section scale must be a positive, finite factor.
    #[error("invalid section scale {scale}")]
    InvalidScale {
        /// Configured scale.
        scale: f32,
    },

    /// A section template would not move the terrain forward.
    #[error("template {kind:?} has invalid run {run} / rise {rise}")]
    InvalidTemplate {
        /// Archetype of the offending template.
        kind: SectionType,
        /// Scaled horizontal distance.
        run: f32,
        /// Scaled vertical distance.
        rise: f32,
    },

    /// Event channels need room for at least one pending event.
    #[error("event capacity must be at least 1")]
    InvalidEventCapacity,

    /// Grammar or generator configuration failed.
    #[error("procedural setup failed: {0}")]
    Procedural(#[from] ProceduralError),

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

/// Result type for level operations.
pub type LevelResult<T> = Result<T, LevelError>;
