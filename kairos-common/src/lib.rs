//! # Kairos Common Library
//!
//! Shared code for the Kairos services:
//! - Room analysis value types (detected objects, suggestions, products)
//! - TOML configuration loading and config folder resolution
//! - Common error type

pub mod config;
pub mod error;
pub mod models;

pub use error::{Error, Result};
pub use models::{DetectedObject, Product, RoomLayout, Suggestion};
