//! # Level Configuration
//!
//! One TOML file drives the whole level:
//!
//! ```toml
//! [level]
//! chunk_cache_size = 6
//! section_scale = 1.0
//!
//! [generator]
//! seed = 42
//! chunk_length = 3
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use strider_procedural::section::STANDARD_TEMPLATES;
use strider_procedural::{
    Anchor, GenerationSeed, GeneratorConfig, SectionTemplate, SeededRandom, TemplateSpawner,
};

use crate::error::{LevelError, LevelResult};

/// Streaming and geometry settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LevelConfig {
    /// Chunks kept alive around the player.
    pub chunk_cache_size: usize,
    /// Multiplier applied to every section template.
    pub section_scale: f32,
    /// Replaces the standard template catalogue when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub templates: Option<Vec<SectionTemplate>>,
    /// Where the start chunk begins.
    pub start_anchor: Anchor,
    /// Per-subscriber event queue capacity, applied by [`GameChannels::from_config`].
    ///
    /// [`GameChannels::from_config`]: crate::events::GameChannels::from_config
    pub event_capacity: usize,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            chunk_cache_size: 6,
            section_scale: 1.0,
            templates: None,
            start_anchor: Anchor::ORIGIN,
            event_capacity: 1024,
        }
    }
}

impl LevelConfig {
    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache holds fewer than 2 chunks, the scale is
    /// not a positive finite number, a scaled template has a non-positive or
    /// non-finite run or a non-finite rise, or the event capacity is 0.
    pub fn validate(&self) -> LevelResult<()> {
        if self.chunk_cache_size < 2 {
            return Err(LevelError::InvalidCacheSize {
                size: self.chunk_cache_size,
            });
        }
        if !self.section_scale.is_finite() || self.section_scale <= 0.0 {
            return Err(LevelError::InvalidScale {
                scale: self.section_scale,
            });
        }
        // Every section must advance along x or chunks stop being ordered.
        if let Some(bad) = self
            .scaled_templates()
            .into_iter()
            .find(|t| !t.run.is_finite() || t.run <= 0.0 || !t.rise.is_finite())
        {
            return Err(LevelError::InvalidTemplate {
                kind: bad.kind,
                run: bad.run,
                rise: bad.rise,
            });
        }
        if self.event_capacity == 0 {
            return Err(LevelError::InvalidEventCapacity);
        }
        Ok(())
    }

    /// Template catalogue with the scale applied.
    #[must_use]
    pub fn scaled_templates(&self) -> Vec<SectionTemplate> {
        let base = self
            .templates
            .as_deref()
            .unwrap_or(&STANDARD_TEMPLATES);
        base.iter().map(|t| t.scaled(self.section_scale)).collect()
    }

    /// A spawner over the scaled catalogue, seeded from `seed`.
    #[must_use]
    pub fn build_spawner(&self, seed: GenerationSeed) -> TemplateSpawner {
        TemplateSpawner::new(
            self.scaled_templates(),
            SeededRandom::new(seed.derive(GenerationSeed::SPAWNER_STREAM)),
        )
    }
}

/// Top-level configuration file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StriderConfig {
    /// Streaming and geometry.
    pub level: LevelConfig,
    /// Grammar tuning.
    pub generator: GeneratorConfig,
}

impl StriderConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`LevelError::Parse`] on malformed TOML or unknown keys, or a
    /// validation error from [`StriderConfig::validate`].
    pub fn from_toml_str(text: &str) -> LevelResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Validates both sections.
    ///
    /// # Errors
    ///
    /// As [`LevelConfig::validate`], or [`LevelError::Procedural`] from
    /// [`GeneratorConfig::validate`].
    pub fn validate(&self) -> LevelResult<()> {
        self.level.validate()?;
        self.generator.validate()?;
        Ok(())
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`LevelError::Io`] if the file cannot be read, otherwise as
    /// [`StriderConfig::from_toml_str`].
    pub fn from_file(path: impl AsRef<Path>) -> LevelResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| LevelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strider_procedural::{ProceduralError, SectionSpawner, SectionType};

    #[test]
    fn test_empty_document_is_default() {
        let config = StriderConfig::from_toml_str("").unwrap();
        assert_eq!(config, StriderConfig::default());
        assert_eq!(config.level.chunk_cache_size, 6);
        assert_eq!(config.generator.chunk_length, 3);
    }

    #[test]
    fn test_nested_tables() {
        let config = StriderConfig::from_toml_str(
            r#"
            [level]
            chunk_cache_size = 4
            section_scale = 2.0
            start_anchor = { x = 10.0, y = -5.0 }

            [generator]
            seed = 9
            persist_weights = true
            "#,
        )
        .unwrap();

        assert_eq!(config.level.chunk_cache_size, 4);
        assert_eq!(config.level.start_anchor, Anchor::new(10.0, -5.0));
        assert_eq!(config.generator.seed, 9);
        assert!(config.generator.persist_weights);
    }

    #[test]
    fn test_scale_applies_to_templates() {
        let config = LevelConfig {
            section_scale: 0.5,
            templates: Some(vec![SectionTemplate::new(SectionType::Flat, 8.0, 0.0)]),
            ..LevelConfig::default()
        };
        let mut spawner = config.build_spawner(GenerationSeed::new(1));

        assert_eq!(
            spawner.spawn_section(SectionType::Flat, Anchor::ORIGIN),
            Anchor::new(4.0, 0.0)
        );
    }

    #[test]
    fn test_custom_templates_in_toml() {
        let config = StriderConfig::from_toml_str(
            r#"
            [[level.templates]]
            kind = "Flat"
            run = 2.0
            rise = 0.0
            "#,
        )
        .unwrap();

        assert_eq!(config.level.scaled_templates().len(), 1);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        assert!(matches!(
            StriderConfig::from_toml_str("[level]\nchunk_cache_size = 1"),
            Err(LevelError::InvalidCacheSize { size: 1 })
        ));
        assert!(matches!(
            StriderConfig::from_toml_str("[level]\nsection_scale = 0.0"),
            Err(LevelError::InvalidScale { .. })
        ));
        assert!(matches!(
            StriderConfig::from_toml_str("[level]\nevent_capacity = 0"),
            Err(LevelError::InvalidEventCapacity)
        ));
        assert!(matches!(
            StriderConfig::from_toml_str("[generator]\nchunk_length = 0"),
            Err(LevelError::Procedural(ProceduralError::InvalidChunkLength))
        ));
        assert!(matches!(
            StriderConfig::from_toml_str("[[generator.rules]]\nlhs = \"A\"\nrhs = \"A\""),
            Err(LevelError::Procedural(ProceduralError::UnproductiveSymbol { symbol: 'A' }))
        ));
        assert!(matches!(
            StriderConfig::from_toml_str("[level]\ncache = 3"),
            Err(LevelError::Parse(_))
        ));
    }

    #[test]
    fn test_templates_must_advance() {
        for (run, rise) in [(0.0, 0.0), (-2.0, 1.0), (f32::NAN, 0.0), (4.0, f32::INFINITY)] {
            let config = LevelConfig {
                templates: Some(vec![SectionTemplate::new(SectionType::Flat, run, rise)]),
                ..LevelConfig::default()
            };
            assert!(
                matches!(
                    config.validate(),
                    Err(LevelError::InvalidTemplate {
                        kind: SectionType::Flat,
                        ..
                    })
                ),
                "run {run} rise {rise} accepted"
            );
        }

        let overflow = LevelConfig {
            section_scale: f32::MAX,
            templates: Some(vec![SectionTemplate::new(SectionType::Flat, 4.0, 0.0)]),
            ..LevelConfig::default()
        };
        assert!(matches!(
            overflow.validate(),
            Err(LevelError::InvalidTemplate { .. })
        ));

        assert!(matches!(
            StriderConfig::from_toml_str(
                "[[level.templates]]\nkind = \"Flat\"\nrun = 0.0\nrise = 0.0"
            ),
            Err(LevelError::InvalidTemplate { .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            StriderConfig::from_file("/nonexistent/level.toml"),
            Err(LevelError::Io { .. })
        ));
    }
}
