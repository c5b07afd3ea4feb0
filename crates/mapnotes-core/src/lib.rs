//! # mapnotes-core
//!
//! Core types, geometry, and collaborator traits for the map notes layer.
//!
//! This crate provides the data entities parsed from the notes feed, the
//! viewport and pixel-space geometry used for placement, and the trait
//! seams behind which settings, connectivity, and commit backends live.

pub mod config;
pub mod defaults;
pub mod error;
pub mod geometry;
pub mod logging;
pub mod models;
pub mod traits;

// Re-export commonly used types at crate root
pub use config::LayerConfig;
pub use error::{Error, Result};
pub use geometry::*;
pub use models::*;
pub use traits::*;
