//! # Level Streaming
//!
//! Keeps a fixed number of chunks alive around the player.
//!
//! ## Window Layout
//!
//! ```text
//! logical index:   0        1        2        3        4        5
//!               [newest] [  ..  ] [  ..  ] [  ..  ] [  ..  ] [oldest]
//!                  ahead of the player  <───────────>  behind the player
//! ```
//!
//! Chunks are appended at index 0, each anchored on the previous newest
//! chunk's end, so logical order is spatial order. When the player's chunk
//! drifts into the front half of the window the oldest chunk is retired and a
//! fresh one is generated. At most one chunk is swapped per update.

use strider_core::RollingWindow;
use strider_procedural::{
    Anchor, ChunkLayout, GrammarGenerator, ProductionString, SectionSpawner, TemplateSpawner,
};
use tracing::{debug, info, warn};

use crate::config::StriderConfig;
use crate::error::LevelResult;
use crate::events::{
    ChunkEntered, ChunkId, ChunkRetired, ChunkSpawned, EndGame, GameChannels, PlayerDied,
    PlayerJumped, ScoreChanged, ScoredPoints, Subscription,
};
use crate::stats::GameStats;

/// One chunk living in the level.
#[derive(Clone, Debug, PartialEq)]
pub struct LevelChunk {
    /// Sequential id.
    pub id: ChunkId,
    /// Grammar output (`None` for the start chunk).
    pub production: Option<ProductionString>,
    /// Placed sections.
    pub layout: ChunkLayout,
}

/// Subscriptions the manager listens on.
struct Inbox {
    chunk_entered: Subscription<ChunkEntered>,
    scored_points: Subscription<ScoredPoints>,
    player_jumped: Subscription<PlayerJumped>,
    player_died: Subscription<PlayerDied>,
}

impl Inbox {
    fn subscribe(channels: &GameChannels) -> Self {
        Self {
            chunk_entered: channels.chunk_entered.subscribe(),
            scored_points: channels.scored_points.subscribe(),
            player_jumped: channels.player_jumped.subscribe(),
            player_died: channels.player_died.subscribe(),
        }
    }

    fn discard_pending(&self) {
        let _ = self.chunk_entered.drain();
        let _ = self.scored_points.drain();
        let _ = self.player_jumped.drain();
        let _ = self.player_died.drain();
    }
}

/// Streams chunks through a [`RollingWindow`] as the player advances.
pub struct LevelManager<S = TemplateSpawner> {
    generator: GrammarGenerator,
    spawner: S,
    chunk_length: usize,
    start_anchor: Anchor,
    chunks: RollingWindow<LevelChunk>,
    next_id: u64,
    current: Option<ChunkId>,
    stats: GameStats,
    started: bool,
    ended: bool,
    channels: GameChannels,
    inbox: Inbox,
}

impl LevelManager<TemplateSpawner> {
    /// Creates a manager with the configured template spawner.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: &StriderConfig, channels: &GameChannels) -> LevelResult<Self> {
        let spawner = config.level.build_spawner(config.generator.generation_seed());
        Self::with_spawner(config, channels, spawner)
    }
}

impl<S: SectionSpawner> LevelManager<S> {
    /// Creates a manager placing sections through `spawner`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn with_spawner(
        config: &StriderConfig,
        channels: &GameChannels,
        spawner: S,
    ) -> LevelResult<Self> {
        config.level.validate()?;
        let generator = config.generator.build_generator()?;

        Ok(Self {
            generator,
            spawner,
            chunk_length: config.generator.chunk_length,
            start_anchor: config.level.start_anchor,
            chunks: RollingWindow::new(config.level.chunk_cache_size),
            next_id: 0,
            current: None,
            stats: GameStats::default(),
            started: false,
            ended: false,
            channels: channels.clone(),
            inbox: Inbox::subscribe(channels),
        })
    }

    /// Starts (or restarts) a run.
    ///
    /// Retires any existing chunks, places the start chunk, makes it current
    /// and fills the window with generated chunks.
    pub fn start(&mut self) {
        while let Some(oldest) = self.chunks.len().checked_sub(1) {
            let Ok(chunk) = self.chunks.remove_at(oldest) else {
                break;
            };
            self.channels.chunk_retired.publish(ChunkRetired { chunk: chunk.id });
        }
        self.inbox.discard_pending();
        self.generator.reset_weights();
        self.stats = GameStats::default();
        self.next_id = 0;
        self.ended = false;

        let layout = ChunkLayout::start_platform(&mut self.spawner, self.start_anchor);
        let id = self.push_chunk(None, layout);
        self.current = Some(id);

        while !self.chunks.is_full() {
            self.spawn_chunk();
        }

        self.started = true;
        info!(
            chunks = self.chunks.len(),
            end = ?self.chunks.newest().map(|c| c.layout.end()),
            "level started"
        );
    }

    /// Processes pending events, then swaps at most one chunk.
    ///
    /// Returns `true` if a chunk was retired and a new one spawned.
    pub fn update(&mut self) -> bool {
        if !self.started {
            return false;
        }

        self.process_events();

        if self.ended {
            return false;
        }

        let Some(index) = self.current_index() else {
            warn!(current = ?self.current, "current chunk not in window, streaming paused");
            return false;
        };

        if index * 2 < self.chunks.capacity() {
            self.spawn_chunk();
            return true;
        }
        false
    }

    fn process_events(&mut self) {
        for _ in self.inbox.player_jumped.drain() {
            self.stats.record_jump();
        }

        for ScoredPoints { value } in self.inbox.scored_points.drain() {
            let score = self.stats.add_score(value);
            self.channels.score_changed.publish(ScoreChanged { score });
        }

        for ChunkEntered { chunk } in self.inbox.chunk_entered.drain() {
            if self.chunks.iter().any(|c| c.id == chunk) {
                self.current = Some(chunk);
            } else {
                warn!(%chunk, "entered chunk is not loaded, ignored");
            }
        }

        if !self.inbox.player_died.drain().is_empty() && !self.ended {
            self.stats.final_chunk = self.current;
            self.ended = true;
            info!(stats = ?self.stats, "ending game");
            self.channels.end_game.publish(EndGame { stats: self.stats });
        }
    }

    /// Generates one chunk anchored on the newest chunk's end.
    fn spawn_chunk(&mut self) {
        let origin = self.next_chunk_origin();
        let production = self.generator.generate(self.chunk_length);
        let layout = ChunkLayout::assemble(&production, &mut self.spawner, origin);
        self.push_chunk(Some(production), layout);
    }

    fn push_chunk(&mut self, production: Option<ProductionString>, layout: ChunkLayout) -> ChunkId {
        let id = ChunkId(self.next_id);
        self.next_id += 1;

        let spawned = ChunkSpawned {
            chunk: id,
            production: production.clone(),
            start: layout.start(),
            end: layout.end(),
        };
        debug!(%id, start = ?spawned.start, end = ?spawned.end, "chunk spawned");

        if let Some(retired) = self.chunks.add(LevelChunk {
            id,
            production,
            layout,
        }) {
            debug!(id = %retired.id, "chunk retired");
            self.channels
                .chunk_retired
                .publish(ChunkRetired { chunk: retired.id });
        }
        self.channels.chunk_spawned.publish(spawned);
        id
    }

    /// Window position of the current chunk.
    #[must_use]
    pub fn current_index(&self) -> Option<usize> {
        let current = self.current?;
        self.chunks.iter().position(|c| c.id == current)
    }

    /// Chunk the player is on.
    #[must_use]
    pub fn current_chunk(&self) -> Option<&LevelChunk> {
        self.current_index().and_then(|i| self.chunks.get(i))
    }

    /// Loaded chunks, newest first.
    #[must_use]
    pub fn chunks(&self) -> &RollingWindow<LevelChunk> {
        &self.chunks
    }

    /// Looks up a loaded chunk by id.
    #[must_use]
    pub fn chunk(&self, id: ChunkId) -> Option<&LevelChunk> {
        self.chunks.iter().find(|c| c.id == id)
    }

    /// Where the next generated chunk will start.
    #[must_use]
    pub fn next_chunk_origin(&self) -> Anchor {
        self.chunks
            .newest()
            .map_or(self.start_anchor, |c| c.layout.end())
    }

    /// Stats of the current run.
    #[must_use]
    pub const fn stats(&self) -> &GameStats {
        &self.stats
    }

    /// True once the player died.
    #[must_use]
    pub const fn is_over(&self) -> bool {
        self.ended
    }

    /// True after [`start`](Self::start).
    #[must_use]
    pub const fn has_started(&self) -> bool {
        self.started
    }

    /// The section spawner.
    #[must_use]
    pub fn spawner(&self) -> &S {
        &self.spawner
    }
}
