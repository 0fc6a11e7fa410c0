//! # STRIDER
//!
//! The main game crate: level streaming on top of the grammar generator.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌─────────────────┐     ┌─────────────────┐
//! │ strider_core    │     │ strider_        │     │ strider         │
//! │                 │     │ procedural      │     │                 │
//! │  • RollingWindow│────>│  • Grammar      │────>│  • LevelManager │
//! │                 │     │  • Sections     │     │  • Events       │
//! │                 │     │  • Chunks       │     │  • Stats        │
//! └─────────────────┘     └─────────────────┘     └─────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `events`: Typed publish/subscribe channels
//! - `level`: Chunk streaming around the player
//! - `config`: TOML configuration for a whole level
//! - `stats`: Per-run tally

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod error;
pub mod events;
pub mod level;
pub mod stats;

// Re-export the lower crates
pub use strider_core as core;
pub use strider_procedural as procedural;

// Re-export commonly used types
pub use config::{LevelConfig, StriderConfig};
pub use error::{LevelError, LevelResult};
pub use events::{
    ChunkEntered, ChunkId, ChunkRetired, ChunkSpawned, EndGame, EventChannel, GameChannels,
    GameChannelsBuilder, PlayerDied, PlayerJumped, ScoreChanged, ScoredPoints, Subscription,
};
pub use level::{LevelChunk, LevelManager};
pub use stats::GameStats;
