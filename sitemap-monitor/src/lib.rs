//! sitemap-monitor library crate.
//!
//! Polls a product sitemap, diffs it against the last observed snapshot and
//! announces products once their probe URL resolves.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod monitor;
pub mod notification;
pub mod sitemap;
pub mod state;
pub mod utils;

pub use error::{Error, Result};
