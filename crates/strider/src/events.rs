//! # STRIDER Event System
//!
//! Typed publish/subscribe channels between gameplay and the level.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐  ChunkEntered   ┌─────────────┐  ScoreChanged   ┌─────────────┐
//! │  Gameplay   │  ScoredPoints   │   Level     │  EndGame        │     UI      │
//! │  (player)   │────────────────>│  Manager    │────────────────>│  (HUD etc.) │
//! │             │  PlayerJumped   │             │  ChunkSpawned   │             │
//! └─────────────┘  PlayerDied     └─────────────┘  ChunkRetired   └─────────────┘
//! ```
//!
//! Every event type has its own [`EventChannel`]. Each subscriber gets a
//! private bounded crossbeam queue; publishing clones the event into every
//! queue without blocking. Dropping a [`Subscription`] unregisters it.

use std::sync::{Arc, Weak};

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use strider_procedural::{Anchor, ProductionString};
use tracing::{trace, warn};

use crate::config::LevelConfig;
use crate::error::{LevelError, LevelResult};
use crate::stats::GameStats;

/// Sequential identifier of a level chunk. The start chunk is 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkId(pub u64);

impl std::fmt::Display for ChunkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "chunk {}", self.0)
    }
}

// =============================================================================
// Gameplay -> Level
// =============================================================================

/// The player stepped onto a chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkEntered {
    /// Chunk the player is now on.
    pub chunk: ChunkId,
}

/// The player earned points.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScoredPoints {
    /// Points earned (may be negative for penalties).
    pub value: i64,
}

/// The player jumped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlayerJumped;

/// The player died.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlayerDied;

// =============================================================================
// Level -> Others
// =============================================================================

/// Running score after a [`ScoredPoints`] was applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScoreChanged {
    /// New total.
    pub score: i64,
}

/// The run is over.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EndGame {
    /// Final statistics.
    pub stats: GameStats,
}

/// A chunk was generated and placed.
#[derive(Clone, Debug, PartialEq)]
pub struct ChunkSpawned {
    /// New chunk.
    pub chunk: ChunkId,
    /// Grammar output it was built from (`None` for the start chunk).
    pub production: Option<ProductionString>,
    /// Start anchor.
    pub start: Anchor,
    /// End anchor.
    pub end: Anchor,
}

/// A chunk left the rolling window and should be destroyed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkRetired {
    /// Retired chunk.
    pub chunk: ChunkId,
}

// =============================================================================
// Channels
// =============================================================================

struct Registry<E> {
    next_id: u64,
    subscribers: Vec<(u64, Sender<E>)>,
}

/// Fan-out channel for one event type.
///
/// Cloning yields another publisher for the same subscribers.
pub struct EventChannel<E> {
    registry: Arc<Mutex<Registry<E>>>,
    capacity: usize,
}

impl<E> Clone for EventChannel<E> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            capacity: self.capacity,
        }
    }
}

impl<E: Clone> EventChannel<E> {
    /// Creates a channel whose subscribers buffer up to `capacity` events.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "event channel capacity must be at least 1");
        Self {
            registry: Arc::new(Mutex::new(Registry {
                next_id: 0,
                subscribers: Vec::new(),
            })),
            capacity,
        }
    }

    /// Registers a new subscriber.
    #[must_use]
    pub fn subscribe(&self) -> Subscription<E> {
        let (sender, receiver) = bounded(self.capacity);
        let mut registry = self.registry.lock();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.subscribers.push((id, sender));

        Subscription {
            id,
            receiver,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Delivers `event` to every live subscriber without blocking.
    ///
    /// Returns the number of subscribers that received it. A subscriber whose
    /// queue is full misses the event.
    pub fn publish(&self, event: E) -> usize {
        let mut registry = self.registry.lock();
        let mut delivered = 0;

        registry.subscribers.retain(|(id, sender)| {
            match sender.try_send(event.clone()) {
                Ok(()) => {
                    delivered += 1;
                    true
                }
                Err(TrySendError::Full(_)) => {
                    warn!(subscriber = id, "event queue full, event dropped");
                    true
                }
                Err(TrySendError::Disconnected(_)) => false,
            }
        });

        trace!(delivered, "event published");
        delivered
    }

    /// Number of registered subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.registry.lock().subscribers.len()
    }
}

/// Receiving side of one [`EventChannel`] registration.
pub struct Subscription<E> {
    id: u64,
    receiver: Receiver<E>,
    registry: Weak<Mutex<Registry<E>>>,
}

impl<E> Subscription<E> {
    /// Receives all pending events (non-blocking).
    #[inline]
    pub fn drain(&self) -> Vec<E> {
        self.receiver.try_iter().collect()
    }

    /// Receives one event (non-blocking).
    #[inline]
    pub fn try_recv(&self) -> Option<E> {
        self.receiver.try_recv().ok()
    }

    /// Returns the number of pending events.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Checks if there are pending events.
    #[inline]
    #[must_use]
    pub fn has_events(&self) -> bool {
        !self.receiver.is_empty()
    }
}

impl<E> Drop for Subscription<E> {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.lock().subscribers.retain(|(id, _)| *id != self.id);
        }
    }
}

/// Builder for [`GameChannels`].
pub struct GameChannelsBuilder {
    capacity: usize,
}

impl GameChannelsBuilder {
    /// Creates a new builder with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self { capacity: 1024 }
    }

    /// Sets the per-subscriber queue capacity.
    #[must_use]
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Builds every channel.
    #[must_use]
    pub fn build(self) -> GameChannels {
        GameChannels {
            chunk_entered: EventChannel::new(self.capacity),
            scored_points: EventChannel::new(self.capacity),
            player_jumped: EventChannel::new(self.capacity),
            player_died: EventChannel::new(self.capacity),

            score_changed: EventChannel::new(self.capacity),
            end_game: EventChannel::new(self.capacity),
            chunk_spawned: EventChannel::new(self.capacity),
            chunk_retired: EventChannel::new(self.capacity),
        }
    }
}

impl Default for GameChannelsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Every channel of the game.
///
/// Cloning shares the channels, so each system can hold its own copy.
#[derive(Clone)]
pub struct GameChannels {
    // Gameplay -> Level
    /// Player moved onto a chunk.
    pub chunk_entered: EventChannel<ChunkEntered>,
    /// Player earned points.
    pub scored_points: EventChannel<ScoredPoints>,
    /// Player jumped.
    pub player_jumped: EventChannel<PlayerJumped>,
    /// Player died.
    pub player_died: EventChannel<PlayerDied>,

    // Level -> Others
    /// Score total changed.
    pub score_changed: EventChannel<ScoreChanged>,
    /// Run ended.
    pub end_game: EventChannel<EndGame>,
    /// Chunk placed.
    pub chunk_spawned: EventChannel<ChunkSpawned>,
    /// Chunk left the window.
    pub chunk_retired: EventChannel<ChunkRetired>,
}

impl GameChannels {
    /// Creates every channel with default settings.
    #[must_use]
    pub fn new() -> Self {
        GameChannelsBuilder::new().build()
    }

    /// Creates every channel with the configured queue capacity.
    ///
    /// # Errors
    ///
    /// Returns [`LevelError::InvalidEventCapacity`] if the capacity is 0.
    pub fn from_config(config: &LevelConfig) -> LevelResult<Self> {
        if config.event_capacity == 0 {
            return Err(LevelError::InvalidEventCapacity);
        }
        Ok(GameChannelsBuilder::new()
            .capacity(config.event_capacity)
            .build())
    }
}

impl Default for GameChannels {
    fn default() -> Self {
        Self::new()
    }
}
