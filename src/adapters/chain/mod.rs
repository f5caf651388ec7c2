//! Chain Adapters - Polygon Blockchain Interaction Layer
//!
//! Provides on-chain access via alloy-rs 0.9 for:
//! - RPC provider management with startup chain-id validation
//! - Market-factory contract calls (create, resolve, outcome query)

pub mod gateway;
pub mod provider;

pub use gateway::FactoryGateway;
pub use provider::RpcProvider;
