//! # Session Clock
//!
//! Millisecond time source for the world model. The system clock stops while
//! the game is paused so power-ups and spawn timers only count playing time.

use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

/// Monotonic game time in milliseconds since the session began.
pub trait Clock: Send + Sync + Debug {
    fn now_ms(&self) -> u64;

    /// Stops time until [`Clock::resume`].
    fn pause(&self) {}

    fn resume(&self) {}
}

#[derive(Debug)]
struct SystemClockState {
    paused_at: Option<Instant>,
    paused_total_ms: u64,
}

/// Wall-clock time excluding paused intervals.
#[derive(Debug)]
pub struct SystemClock {
    origin: Instant,
    state: Mutex<SystemClockState>,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            state: Mutex::new(SystemClockState {
                paused_at: None,
                paused_total_ms: 0,
            }),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let reference = state.paused_at.unwrap_or_else(Instant::now);
        let raw = reference.duration_since(self.origin).as_millis() as u64;
        raw.saturating_sub(state.paused_total_ms)
    }

    fn pause(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.paused_at.is_none() {
            state.paused_at = Some(Instant::now());
        }
    }

    fn resume(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(paused_at) = state.paused_at.take() {
            state.paused_total_ms += paused_at.elapsed().as_millis() as u64;
        }
    }
}

/// Clock that only moves when told to.
///
/// # Examples
///
/// ```
/// use mazechase::{Clock, ManualClock};
///
/// let clock = ManualClock::new();
/// clock.advance(400);
/// assert_eq!(clock.now_ms(), 400);
/// ```
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, ms: u64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }

    pub fn set(&self, ms: u64) {
        self.now.store(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_manual_clock_moves_only_on_demand() {
        let clock = ManualClock::new();
        assert_eq!(clock.now_ms(), 0);
        clock.advance(250);
        clock.advance(250);
        assert_eq!(clock.now_ms(), 500);
        clock.set(42);
        assert_eq!(clock.now_ms(), 42);
    }

    #[test]
    fn test_system_clock_stands_still_while_paused() {
        let clock = SystemClock::new();
        clock.pause();
        let frozen = clock.now_ms();
        thread::sleep(Duration::from_millis(30));
        assert_eq!(clock.now_ms(), frozen);
        clock.resume();
        let resumed = Instant::now();
        thread::sleep(Duration::from_millis(5));
        let now = clock.now_ms();
        assert!(now >= frozen);
        assert!(now <= frozen + resumed.elapsed().as_millis() as u64 + 2);
    }
}
