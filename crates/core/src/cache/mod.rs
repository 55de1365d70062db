//! SQLite-backed Cache Storage for the offline shell.
//!
//! This module provides named cache stores holding request/response pairs,
//! with async access via tokio-rusqlite. It supports:
//!
//! - One store per cache generation, enumerated in creation order
//! - Lookup by request identity (method + URL, fragment ignored)
//! - Atomic population, so a failed precache never leaves a partial store
//! - Automatic schema migrations

pub mod connection;
pub mod entries;
pub mod hash;
pub mod migrations;
pub mod stores;

pub use crate::Error;

pub use connection::CacheDb;
pub use entries::CachedEntry;
pub use stores::{CacheGeneration, StoreSummary};
