//! Shared types and models for the CropWatch monitoring platform
//!
//! This crate contains the domain models and the pure analytics core
//! (stress classification, trend forecasting, alert cooldown policy)
//! shared between the backend and other components of the system.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
