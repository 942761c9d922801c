//! Pizza Friday attendance engine.
//!
//! Storage backends, calendar gateways and the [`engine::Engine`] that ties
//! them together. Domain types and contracts live in [`rsvp_core`].

pub mod config;
pub mod engine;
pub mod gateway;
pub mod storage;
