//! Kotodama Runtime - frame loop plumbing
//!
//! The pieces that sit between the host window and the simulation:
//! - `PerformanceProfiler` - one-shot CPU speed probe → population tier
//! - `FrameScheduler` - tickable frame clock with a cancellation token
//! - `RenderSettings` / `AppConfig` - explicit per-frame settings, no
//!   ambient globals

mod profiler;
mod scheduler;
mod settings;

pub use profiler::{PerformanceProfiler, PerformanceTier, TierProfile};
pub use scheduler::{CancelToken, FrameScheduler, FrameTick};
pub use settings::{AppConfig, RenderSettings};
