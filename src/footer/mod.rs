//! # Progress Footer
//!
//! Keeps a step-progress display pinned to the bottom of the terminal while
//! agent output scrolls above it.
//!
//! ```text
//! ┌──────────────────────────────┐
//! │ agent output ...             │  rows 1..=scroll_bottom scroll
//! │ ...                          │
//! ├──────────────────────────────┤
//! │ ──────────────────────────── │  separator
//! │   ✔ Create schema (12s)      │  one line per step
//! │   ▸ Write queries (4s)       │
//! │   ○ Add tests                │
//! └──────────────────────────────┘
//! ```
//!
//! ## Key Types
//!
//! - [`StickyFooter`] - Owns the terminal while active, restores it on cleanup
//! - [`render_step_progress`] - Pure renderer for the footer lines
//! - [`Terminal`] - What the footer writes to; [`MemoryTerminal`] for tests

mod ansi;
mod render;
mod signals;
mod sticky;
mod terminal;

pub use ansi::{ResetScrollRegion, SetScrollRegion};
pub use render::{render_step_progress, title_width, truncate};
pub use signals::{exit_code_for, redeliver, SignalHooks, FORWARDED};
pub use sticky::{FooterError, StickyFooter};
pub use terminal::{MemoryTerminal, StdTerminal, Terminal, DEFAULT_COLUMNS, DEFAULT_ROWS};

/// Footers claim the terminal process-wide, so tests that start one take
/// this lock first
#[cfg(test)]
pub(crate) fn test_lock() -> std::sync::MutexGuard<'static, ()> {
    static LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
    LOCK.lock().unwrap_or_else(|e| e.into_inner())
}
