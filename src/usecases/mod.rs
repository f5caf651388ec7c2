//! Use Cases Layer - Application Business Logic
//!
//! Orchestrates domain logic with port interfaces to implement the
//! pipeline's core workflows. Each use case is a self-contained
//! business operation.
//!
//! Use cases:
//! - `Seeder`: Merge upstream game descriptors into the record store
//! - `BatchOrchestrator`: Per-record create/resolve state machine

pub mod orchestrator;
pub mod seeder;
