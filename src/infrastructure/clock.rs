//! Clock adapters.

use chrono::{DateTime, Utc};
use tokio::time::Instant;

use crate::domain::Clock;

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Wall clock that advances with tokio's timer.
///
/// Under a paused runtime (`tokio::time::pause`) it moves only when tokio
/// time moves, so token expiry and scheduled timers share one virtual
/// timeline.
#[derive(Debug, Clone, Copy)]
pub struct TokioClock {
    origin_wall: DateTime<Utc>,
    origin: Instant,
}

impl TokioClock {
    /// Anchor the clock at the current wall time.
    pub fn new() -> Self {
        Self::starting_at(Utc::now())
    }

    /// Anchor the clock at `wall`.
    pub fn starting_at(wall: DateTime<Utc>) -> Self {
        Self {
            origin_wall: wall,
            origin: Instant::now(),
        }
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TokioClock {
    fn now(&self) -> DateTime<Utc> {
        let elapsed = chrono::Duration::from_std(self.origin.elapsed())
            .unwrap_or_else(|_| chrono::Duration::zero());
        self.origin_wall + elapsed
    }
}
