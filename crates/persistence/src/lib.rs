//! Persistence layer for the Trinetra backend.
//!
//! This crate is the durable-storage collaborator for geofences, device
//! locations, command state, and safe-app allow-lists. Storage mechanics
//! are out of the core's scope, so records live in async in-memory
//! stores; every access goes through the repository operations, never
//! through shared state elsewhere.

pub mod metrics;
pub mod repositories;
