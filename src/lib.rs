//! newsdesk: a terminal news browser for NewsAPI.
//!
//! The [`app::App`] controller owns query, pagination, results and the
//! bookmark set. The [`ui`] layer turns key presses into controller calls and
//! runs the fetches and storage writes those calls ask for.

pub mod api;
pub mod app;
pub mod config;
pub mod storage;
pub mod theme;
pub mod ui;
pub mod util;
