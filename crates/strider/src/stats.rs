//! # Game Statistics

use serde::{Deserialize, Serialize};

use crate::events::ChunkId;

/// Per-run tally, reset when a level starts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStats {
    /// Chunk the player was on when the run ended.
    pub final_chunk: Option<ChunkId>,
    /// Jumps made.
    pub jumps: u32,
    /// Points scored.
    pub score: i64,
}

impl GameStats {
    /// Counts one jump.
    #[inline]
    pub fn record_jump(&mut self) {
        self.jumps = self.jumps.saturating_add(1);
    }

    /// Adds `value` to the score and returns the new total.
    #[inline]
    pub fn add_score(&mut self, value: i64) -> i64 {
        self.score = self.score.saturating_add(value);
        self.score
    }
}
