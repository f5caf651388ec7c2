//! Store Adapters - JSON Record-File Persistence
//!
//! Implements the `RecordStore` port with an atomic whole-file JSON
//! store plus an advisory lock that enforces the single-writer
//! discipline across runs. No database dependency — lightweight and
//! crash-recoverable.

pub mod json_store;
pub mod lock;

pub use json_store::JsonRecordStore;
pub use lock::RunLock;
