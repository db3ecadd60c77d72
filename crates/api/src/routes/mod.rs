//! HTTP route handlers.

pub mod childlock;
pub mod commands;
pub mod geofences;
pub mod health;
pub mod locations;
pub mod sos;
