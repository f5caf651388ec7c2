//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! external dependencies (HTTP client, blockchain RPC, file I/O). Each
//! sub-module groups adapters by infrastructure concern.
//!
//! Adapter categories:
//! - `chain`: Polygon blockchain interaction via alloy-rs
//! - `store`: Atomic JSON record-file persistence
//! - `upstream`: Third-party games feed over HTTP

pub mod chain;
pub mod store;
pub mod upstream;
