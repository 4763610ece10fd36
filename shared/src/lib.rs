//! Shared types and models for the Crop Advisory Platform
//!
//! This crate contains types shared between the backend, the browser client
//! (via WASM), and the report viewer.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
