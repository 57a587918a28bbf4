//! Durable monitor state.
//!
//! One [`MonitorState`] document is loaded at the start of every cycle and
//! written back whole at the end of it.

mod model;
mod store;

pub use model::{MonitorState, WatchItem};
pub use store::{JsonFileStore, StateStore};
