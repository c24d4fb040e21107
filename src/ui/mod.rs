//! Terminal User Interface module.
//!
//! This module provides the TUI for the news browser, including:
//! - Main event loop (`run`)
//! - Input handling for the news list, bookmark list, and search box
//! - Rendering for cards, header and status bar
//! - Background task event processing
//!
//! # Module Structure
//!
//! - `loop_runner` - Main event loop and terminal management
//! - `input` - Keyboard input handling
//! - `events` - Background task event processing
//! - `render` - View rendering dispatch and header
//! - `helpers` - Task spawning and browser opening
//! - `news` - News list widget
//! - `bookmarks` - Bookmark list widget
//! - `status` - Status bar widget

mod bookmarks;
mod events;
mod helpers;
mod input;
mod loop_runner;
mod news;
mod render;
mod status;

// Re-export the public API
pub use helpers::start_fetch;
pub use loop_runner::{run, Action};
