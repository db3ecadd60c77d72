//! Shared utilities and common types for the Trinetra backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Cryptographic utilities (hashing, confirmation-code generation)
//! - Common validation logic (coordinates, radii, contact channels)

pub mod crypto;
pub mod validation;
