//! # STRIDER Chunk Preview
//!
//! Headless level walk. Streams chunks exactly as the game would and prints
//! every chunk that enters or leaves the window.
//!
//! ## Usage
//!
//! ```bash
//! # Default level, 20 chunks
//! chunk_preview
//!
//! # Custom config, longer walk, generator logs
//! RUST_LOG=strider_procedural=debug chunk_preview --config level.toml --chunks 200
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use strider::procedural::SectionType;
use strider::{
    ChunkEntered, ChunkId, ChunkRetired, ChunkSpawned, GameChannels, LevelManager, PlayerDied,
    PlayerJumped, ScoredPoints, StriderConfig, Subscription,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "chunk_preview")]
#[command(about = "Walk a generated STRIDER level and print its chunks")]
#[command(version)]
struct Args {
    /// Level configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Chunks to walk before the player dies
    #[arg(short = 'n', long, default_value_t = 20)]
    chunks: u64,

    /// Override the configured seed
    #[arg(short, long)]
    seed: Option<u64>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("═══════════════════════════════════════════════════════════════════");
    println!("                    STRIDER CHUNK PREVIEW v0.1.0");
    println!("═══════════════════════════════════════════════════════════════════");
    println!();

    let mut config = match &args.config {
        Some(path) => match StriderConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("   ✗ FATAL: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => StriderConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.generator.seed = seed;
    }

    println!("  Seed:         {}", config.generator.seed);
    println!("  Cache size:   {}", config.level.chunk_cache_size);
    println!("  Chunk length: {}", config.generator.chunk_length);
    println!();

    let channels = match GameChannels::from_config(&config.level) {
        Ok(channels) => channels,
        Err(e) => {
            eprintln!("   ✗ FATAL: {e}");
            return ExitCode::FAILURE;
        }
    };
    let mut level = match LevelManager::new(&config, &channels) {
        Ok(level) => level,
        Err(e) => {
            eprintln!("   ✗ FATAL: {e}");
            return ExitCode::FAILURE;
        }
    };

    let spawned = channels.chunk_spawned.subscribe();
    let retired = channels.chunk_retired.subscribe();
    let ended = channels.end_game.subscribe();

    level.start();
    print_spawned(&spawned);

    walk(&mut level, &channels, args.chunks, &spawned, &retired);

    channels.player_died.publish(PlayerDied);
    level.update();

    println!();
    println!("═══════════════════════════════════════════════════════════════════");
    if let Some(end) = ended.try_recv() {
        let stats = end.stats;
        println!(
            "  Final chunk: {}",
            stats.final_chunk.map_or_else(|| "-".to_string(), |c| c.to_string())
        );
        println!("  Jumps:       {}", stats.jumps);
        println!("  Score:       {}", stats.score);
    }
    println!("═══════════════════════════════════════════════════════════════════");

    ExitCode::SUCCESS
}

/// Moves the player one chunk per frame, scoring and jumping along the way.
fn walk(
    level: &mut LevelManager,
    channels: &GameChannels,
    chunks: u64,
    spawned: &Subscription<ChunkSpawned>,
    retired: &Subscription<ChunkRetired>,
) {
    for step in 1..=chunks {
        let target = ChunkId(step);

        if let Some(chunk) = level.chunk(target) {
            let jumps = chunk
                .layout
                .sections()
                .iter()
                .filter(|s| {
                    matches!(
                        s.kind,
                        SectionType::JumpUp | SectionType::JumpDown | SectionType::Hopscotch
                    )
                })
                .count();
            for _ in 0..jumps {
                channels.player_jumped.publish(PlayerJumped);
            }
            let value = i64::try_from(chunk.layout.section_count()).unwrap_or(i64::MAX);
            channels.scored_points.publish(ScoredPoints { value });
        }
        channels.chunk_entered.publish(ChunkEntered { chunk: target });

        // Catch up: one swap per frame until the player is behind the middle again.
        while level.update() {}

        for event in retired.drain() {
            println!("  - retired {}", event.chunk);
        }
        print_spawned(spawned);
    }

    info!(chunks, stats = ?level.stats(), "walk finished");
}

fn print_spawned(spawned: &Subscription<ChunkSpawned>) {
    for event in spawned.drain() {
        let production = event
            .production
            .as_ref()
            .map_or_else(|| "(start)".to_string(), |p| p.compact());
        println!(
            "  + {:<10} {:<16} ({:>8.1}, {:>6.1}) -> ({:>8.1}, {:>6.1})",
            event.chunk.to_string(),
            production,
            event.start.x,
            event.start.y,
            event.end.x,
            event.end.y,
        );
    }
}
