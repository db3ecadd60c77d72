//! Domain layer for the Trinetra backend.
//!
//! This crate contains:
//! - Domain models (Geofence, DeviceLocation, DeviceCommandState, Contact)
//! - Business logic services (geospatial math, SOS dispatch, secret
//!   verification)
//! - Domain error types

pub mod models;
pub mod services;
