//! Kotodama Field - pooled word-particle simulation
//!
//! Provides the CPU side of the floating-word field:
//! - Slot-arena particle pool with free-list recycling
//! - Per-tick integrate/age/fade/bounce/respawn lifecycle
//! - Seeded random spawning for reproducible runs
//!
//! Rendering is deliberately absent: the field hands out stable slot ids
//! and plain particle records, and the renderer keeps its GPU meshes in a
//! cache keyed by those ids.

mod field;
mod particle;

pub use field::{FieldConfig, ParticleField};
pub use particle::{Orientation, Particle, ParticlePool, Phase, SlotId};
