//! Frame scheduler: a tickable clock with cooperative cancellation
//!
//! The host's redraw callback calls `tick()` once per display refresh;
//! tests call it synchronously as many times as they need. Cancellation is
//! checked at the top of every tick, so stopping the loop is always a
//! one-frame affair.
//!
//! The measured wall clock here feeds only the background shader's time
//! uniform; particle aging uses the field's fixed step.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Shared flag for stopping the frame loop from teardown
#[derive(Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// One frame's worth of timing, handed to the render path
#[derive(Debug, Clone, Copy)]
pub struct FrameTick {
    /// Frames elapsed since the scheduler started, starting at 0
    pub frame: u64,
    /// Wall-clock seconds since the scheduler started
    pub elapsed: f64,
    /// Wall-clock seconds since the previous tick (clamped)
    pub delta: f64,
}

pub struct FrameScheduler {
    token: CancelToken,
    started: Instant,
    last_tick: Option<Instant>,
    frame: u64,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self {
            token: CancelToken::new(),
            started: Instant::now(),
            last_tick: None,
            frame: 0,
        }
    }

    /// Token to hand to teardown; cancelling it makes every later `tick`
    /// return None.
    pub fn cancel_token(&self) -> CancelToken {
        self.token.clone()
    }

    /// Advance one frame. Returns None once cancelled.
    pub fn tick(&mut self) -> Option<FrameTick> {
        if self.token.is_cancelled() {
            return None;
        }
        let now = Instant::now();
        let delta = match self.last_tick {
            // Clamp pathological frame gaps (debugger pauses, suspend)
            Some(last) => now.duration_since(last).as_secs_f64().min(0.25),
            None => 0.0,
        };
        self.last_tick = Some(now);
        let tick = FrameTick {
            frame: self.frame,
            elapsed: now.duration_since(self.started).as_secs_f64(),
            delta,
        };
        self.frame += 1;
        Some(tick)
    }
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_count_up_from_zero() {
        let mut scheduler = FrameScheduler::new();
        assert_eq!(scheduler.tick().unwrap().frame, 0);
        assert_eq!(scheduler.tick().unwrap().frame, 1);
        assert_eq!(scheduler.tick().unwrap().frame, 2);
    }

    #[test]
    fn first_tick_has_zero_delta() {
        let mut scheduler = FrameScheduler::new();
        assert_eq!(scheduler.tick().unwrap().delta, 0.0);
    }

    #[test]
    fn cancelled_scheduler_stops_ticking() {
        let mut scheduler = FrameScheduler::new();
        let token = scheduler.cancel_token();
        assert!(scheduler.tick().is_some());
        token.cancel();
        assert!(scheduler.tick().is_none());
        assert!(scheduler.tick().is_none());
    }

    #[test]
    fn elapsed_is_monotonic() {
        let mut scheduler = FrameScheduler::new();
        let a = scheduler.tick().unwrap().elapsed;
        let b = scheduler.tick().unwrap().elapsed;
        assert!(b >= a);
    }
}
