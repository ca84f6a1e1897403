//! State management module
//!
//! Handles cursor tracking, checkpointing, and resumability.
//! State is persisted between sync runs to enable incremental syncs.
//!
//! # Overview
//!
//! The state module provides:
//! - `Watermark` - A parsed timestamp that remembers its original text
//! - `Cursor` - Monotonic high-water mark over a record timestamp field
//! - `State` - The persisted document, one `StreamState` per stream
//! - `StateManager` - File-based state persistence

mod cursor;
mod manager;
mod types;

pub use cursor::{Cursor, Watermark};
pub use manager::StateManager;
pub use types::{CursorState, State, StreamState};

#[cfg(test)]
mod cursor_tests;
