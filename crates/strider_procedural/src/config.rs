//! # Generator Configuration
//!
//! Loaded once at startup from TOML. Every field has a default, so an empty
//! document is a valid configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ProceduralError, ProceduralResult};
use crate::grammar::{GrammarGenerator, GrammarTable, ProductionRule, DEFAULT_MAX_ATTEMPTS};
use crate::random::{GenerationSeed, SeededRandom};

/// Tuning for [`GrammarGenerator`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Root seed for every procedural stream.
    pub seed: u64,
    /// Minimum number of terminals per chunk.
    pub chunk_length: usize,
    /// Weighted attempts per expansion before the uniform fallback.
    pub max_attempts: u32,
    /// Keep weight decay between chunks.
    pub persist_weights: bool,
    /// Replaces the master rule set when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules: Option<Vec<ProductionRule>>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: GenerationSeed::default().value(),
            chunk_length: 3,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            persist_weights: false,
            rules: None,
        }
    }
}

impl GeneratorConfig {
    /// Parses a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ProceduralError::Parse`] on malformed TOML, unknown keys or
    /// mistyped values.
    pub fn from_toml_str(text: &str) -> ProceduralResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Reads and parses a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ProceduralError::Io`] if the file cannot be read, otherwise
    /// as [`GeneratorConfig::from_toml_str`].
    pub fn from_file(path: impl AsRef<Path>) -> ProceduralResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ProceduralError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Seed wrapper for the configured root seed.
    #[inline]
    #[must_use]
    pub const fn generation_seed(&self) -> GenerationSeed {
        GenerationSeed::new(self.seed)
    }

    /// Checks the chunk length and the rule table.
    ///
    /// # Errors
    ///
    /// Returns [`ProceduralError::InvalidChunkLength`] if chunks would hold no
    /// sections, or a table error from [`GeneratorConfig::build_table`].
    pub fn validate(&self) -> ProceduralResult<()> {
        if self.chunk_length == 0 {
            return Err(ProceduralError::InvalidChunkLength);
        }
        self.build_table().map(drop)
    }

    /// The rule table this configuration describes.
    ///
    /// # Errors
    ///
    /// Returns a validation error if custom rules are malformed.
    pub fn build_table(&self) -> ProceduralResult<GrammarTable> {
        match &self.rules {
            Some(rules) => GrammarTable::from_rules(rules.iter().cloned()),
            None => Ok(GrammarTable::master()),
        }
    }

    /// A seeded generator with every setting applied.
    ///
    /// # Errors
    ///
    /// As [`GeneratorConfig::validate`].
    pub fn build_generator(&self) -> ProceduralResult<GrammarGenerator> {
        if self.chunk_length == 0 {
            return Err(ProceduralError::InvalidChunkLength);
        }
        let rng = SeededRandom::new(self.generation_seed().derive(GenerationSeed::GRAMMAR_STREAM));
        Ok(GrammarGenerator::with_source(self.build_table()?, rng)
            .with_max_attempts(self.max_attempts)
            .with_persisted_weights(self.persist_weights))
    }
}

/// Annotated example of the file format.
pub const EXAMPLE_CONFIG: &str = r#"
# Root seed, every procedural stream derives from it
seed = 42

# Minimum sections per chunk
chunk_length = 3

# Weighted picks per expansion before falling back to a uniform pick
max_attempts = 100

# Keep halved weights between chunks (repeats get rarer as the level runs)
persist_weights = false

# Optional: replace the built-in rule set. Weight defaults to 1.0.
# [[rules]]
# lhs = "A"
# rhs = "i+a+A"
# weight = 1.0
"#;
