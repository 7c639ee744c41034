//! Clock abstraction — the engine never reads wall time directly, so tests
//! can drive the whole lifecycle from a synthetic clock.

use chrono::{DateTime, FixedOffset, Utc};

use raidwatch_core::catalog::game_timezone;

/// Source of "now" in the fixed reference timezone.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;
}

/// Wall clock pinned to a fixed offset.
#[derive(Debug, Clone)]
pub struct SystemClock {
    offset: FixedOffset,
}

impl SystemClock {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Wall clock in the game-server timezone (KST).
    pub fn game_time() -> Self {
        Self::new(game_timezone())
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_reports_game_offset() {
        let clock = SystemClock::game_time();
        let now = clock.now();
        assert_eq!(now.offset().local_minus_utc(), 9 * 3600);
    }
}
