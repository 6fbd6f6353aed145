//! Kotodama Core - Foundational types for the kotodama visualizer
//!
//! This crate provides the types every other kotodama crate depends on:
//! - `Vec3`, `Color` - Spatial and palette types
//! - `WordRng` - Seeded pseudo-random source for reproducible spawning
//! - Error types and Result alias

mod error;
mod rng;
mod types;

pub use error::{KotodamaError, Result};
pub use rng::WordRng;
pub use types::{Color, Vec3};
