//! # Memory Management
//!
//! Pre-allocated storage for streaming level data.
//!
//! ## Design Philosophy
//!
//! The level keeps a bounded number of chunks alive. The container that holds
//! them is sized once and recycles its slots:
//! - No growth while the player runs
//! - Oldest entries are overwritten, never reallocated
//! - Predictable, flat cost per frame

mod window;

pub use window::{RollingWindow, WindowIter};
