//! # STRIDER Procedural Generation
//!
//! Grammar-driven terrain for an endless 2D runner.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: Same seed always produces the same level
//! 2. **Chunked**: The level is a chain of chunks, each a chain of sections
//! 3. **Seamless**: Every section starts exactly where the previous one ended
//! 4. **Never stuck**: Rule selection always has a fallback
//!
//! ## Core Components
//!
//! - `GrammarGenerator`: Expands the start symbol into a terminal string
//! - `SectionType`: Closed set of terrain archetypes
//! - `SectionSpawner`: Capability that places a section and reports its end
//! - `ChunkLayout`: Sections of one chunk, chained end to end
//! - `GeneratorConfig`: TOML-backed tuning
//!
//! ## Example
//!
//! ```rust
//! use strider_procedural::{Anchor, ChunkLayout, GenerationSeed, GrammarGenerator, TemplateSpawner};
//!
//! let seed = GenerationSeed::new(7);
//! let mut generator = GrammarGenerator::new(seed);
//! let mut spawner = TemplateSpawner::standard(seed);
//!
//! let production = generator.generate(3);
//! let chunk = ChunkLayout::assemble(&production, &mut spawner, Anchor::ORIGIN);
//! assert_eq!(chunk.section_count(), production.sections().count());
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod chunk;
pub mod config;
pub mod error;
pub mod grammar;
pub mod random;
pub mod section;

pub use chunk::{ChunkLayout, PlacedSection};
pub use config::GeneratorConfig;
pub use error::{ProceduralError, ProceduralResult};
pub use grammar::{
    generate_with, GrammarGenerator, GrammarTable, ProductionRule, ProductionString,
    DEFAULT_MAX_ATTEMPTS, END_MARKER, PAIRED_SYMBOL, SEPARATOR, START_SYMBOL,
};
pub use random::{GenerationSeed, RandomSource, SeededRandom};
pub use section::{Anchor, SectionSpawner, SectionTemplate, SectionType, TemplateSpawner};
