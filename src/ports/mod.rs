//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the usecases layer requires from
//! the outside world. Adapters implement these traits.
//!
//! Port categories:
//! - `ChainGateway`: Market creation/resolution on the external ledger
//! - `RecordStore`: Whole-file persistence of market records
//! - `GameSource`: Upstream HTTP feed of game descriptors

pub mod chain_gateway;
pub mod game_source;
pub mod record_store;
