use core::time::Duration;
use serde::{Deserialize, Serialize};
use web_time::Instant;

/// How often the host should deliver a tick while the timer runs.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Ties a scheduled tick to the timer run that issued it. Ticks carrying a token from a run
/// that has since been stopped are ignored.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerToken(u32);

/// Wall-clock timer of a round. Elapsed time is always recomputed from the start instant, so a
/// late tick never makes the readout drift.
#[derive(Clone, Debug, Default)]
pub(crate) struct RoundTimer {
    generation: u32,
    started_at: Option<Instant>,
}

impl RoundTimer {
    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn token(&self) -> Option<TimerToken> {
        self.started_at.map(|_| TimerToken(self.generation))
    }

    pub fn start_at(&mut self, now: Instant) -> TimerToken {
        // a second start replaces the first run instead of ticking twice
        self.cancel();
        self.started_at = Some(now);
        TimerToken(self.generation)
    }

    pub fn cancel(&mut self) {
        self.started_at = None;
        self.generation = self.generation.wrapping_add(1);
    }

    /// Whole seconds since the start, or `None` for a stale token or a stopped timer.
    pub fn elapsed_secs_at(&self, token: TimerToken, now: Instant) -> Option<u32> {
        if token.0 != self.generation {
            return None;
        }
        self.started_at
            .map(|started_at| rounded_secs(now.saturating_duration_since(started_at)))
    }
}

/// Rounds to the nearest whole second.
pub fn rounded_secs(elapsed: Duration) -> u32 {
    let secs = (elapsed.as_millis() + 500) / 1000;
    u32::try_from(secs).unwrap_or(u32::MAX)
}
