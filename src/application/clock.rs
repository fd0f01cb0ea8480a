//! Wall clock used to stamp call records

use chrono::{DateTime, Utc};
use tokio::time::Instant;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// System wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Wall clock driven by the tokio timer
///
/// Anchored to the system time at construction and advanced by the tokio
/// monotonic clock, so it follows paused and auto-advanced time in tests.
#[derive(Debug, Clone, Copy)]
pub struct RuntimeClock {
    anchor: DateTime<Utc>,
    base: Instant,
}

impl RuntimeClock {
    pub fn new() -> Self {
        Self {
            anchor: Utc::now(),
            base: Instant::now(),
        }
    }
}

impl Default for RuntimeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for RuntimeClock {
    fn now(&self) -> DateTime<Utc> {
        let elapsed = chrono::Duration::from_std(self.base.elapsed()).unwrap_or(chrono::Duration::zero());
        self.anchor + elapsed
    }
}
