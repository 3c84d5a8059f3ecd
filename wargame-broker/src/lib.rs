//! Wargame Broker - Playing across processes
//!
//! This crate provides:
//! - Wire types of the broker protocol
//! - Blocking client (polling move source and move publisher)
//! - An axum relay server implementing the same protocol

pub mod client;
pub mod server;
pub mod wire;

pub use client::{BrokerClient, BrokerError, BrokerSource, POLL_INTERVAL};
pub use server::{create_router, run_server, serve, RelayConfig, RelayState};
pub use wire::{BrokerEnvelope, BrokerMove};
