//! # STRIDER Core
//!
//! Fixed-capacity containers shared by the generator and the level manager.
//!
//! ## Architecture Rules
//!
//! 1. **Allocate once** - storage is sized at construction and never grows
//! 2. **Newest first** - logical index 0 is always the most recent item
//! 3. **Loud failures** - unsupported operations return an error instead of
//!    silently dropping writes
//!
//! ## Example
//!
//! ```rust
//! use strider_core::RollingWindow;
//!
//! let mut window = RollingWindow::new(3);
//! for chunk in 1..=4 {
//!     window.add(chunk);
//! }
//! assert_eq!(window.iter().copied().collect::<Vec<_>>(), vec![4, 3, 2]);
//! assert!(!window.contains(&1));
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod error;
pub mod memory;

pub use error::{WindowError, WindowResult};
pub use memory::{RollingWindow, WindowIter};
