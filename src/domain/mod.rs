//! Domain layer - Core business types.
//!
//! This module contains the pure market-record model for the sync bot.
//! No external dependencies allowed here (hexagonal architecture inner ring).
//! All types are serializable and testable in isolation.

pub mod record;

// Re-export core types for convenience
pub use record::{CreationParams, GameId, MarketRecord, MarketStatus};
