//! Status classifier — pure mapping from time-remaining to lifecycle phase.

/// Lifecycle phase of an occurrence relative to "now". The ordering is the
/// temporal order; a live occurrence only ever moves forward through it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    Upcoming,
    Starting,
    Ongoing,
    Finished,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Upcoming => "upcoming",
            Phase::Starting => "starting",
            Phase::Ongoing => "ongoing",
            Phase::Finished => "finished",
        }
    }
}

/// Per-event-class classification windows, in seconds.
#[derive(Debug, Clone, Copy)]
pub struct PhaseWindows {
    /// Remaining time at or below which the occurrence counts as Starting.
    pub start_window_secs: i64,
    /// Elapsed time up to which a started occurrence counts as Ongoing.
    pub grace_window_secs: i64,
}

/// Classify by seconds remaining until the scheduled instant (negative once
/// it has started). Stateless; applied fresh each tick.
pub fn classify(remaining_secs: i64, windows: &PhaseWindows) -> Phase {
    if remaining_secs > windows.start_window_secs {
        Phase::Upcoming
    } else if remaining_secs > 0 {
        Phase::Starting
    } else if -remaining_secs <= windows.grace_window_secs {
        Phase::Ongoing
    } else {
        Phase::Finished
    }
}

/// Human-readable minutes for display strings: floor of the minutes, bumped
/// by one only when the sub-minute remainder exceeds 30 seconds.
pub fn display_minutes(secs: i64) -> i64 {
    if secs <= 0 {
        return 0;
    }
    let mut minutes = secs / 60;
    if secs % 60 > 30 {
        minutes += 1;
    }
    minutes
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOWS: PhaseWindows = PhaseWindows {
        start_window_secs: 300,
        grace_window_secs: 300,
    };

    #[test]
    fn test_classification_bands() {
        assert_eq!(classify(3600, &WINDOWS), Phase::Upcoming);
        assert_eq!(classify(301, &WINDOWS), Phase::Upcoming);
        assert_eq!(classify(300, &WINDOWS), Phase::Starting);
        assert_eq!(classify(1, &WINDOWS), Phase::Starting);
        assert_eq!(classify(0, &WINDOWS), Phase::Ongoing);
        assert_eq!(classify(-300, &WINDOWS), Phase::Ongoing);
        assert_eq!(classify(-301, &WINDOWS), Phase::Finished);
    }

    #[test]
    fn test_drill_windows_are_independent() {
        let drill = PhaseWindows {
            start_window_secs: 120,
            grace_window_secs: 60,
        };
        assert_eq!(classify(121, &drill), Phase::Upcoming);
        assert_eq!(classify(120, &drill), Phase::Starting);
        assert_eq!(classify(-60, &drill), Phase::Ongoing);
        assert_eq!(classify(-61, &drill), Phase::Finished);
    }

    #[test]
    fn test_phases_never_regress_as_time_advances() {
        let mut last = Phase::Upcoming;
        // Sweep a fixed occurrence from 20 minutes out to 20 minutes past.
        for elapsed in 0..=2400 {
            let remaining = 1200 - elapsed;
            let phase = classify(remaining, &WINDOWS);
            assert!(phase >= last, "regressed from {last:?} to {phase:?}");
            last = phase;
        }
        assert_eq!(last, Phase::Finished);
    }

    #[test]
    fn test_display_minutes_rounding() {
        assert_eq!(display_minutes(0), 0);
        assert_eq!(display_minutes(-90), 0);
        // Exactly 30s of remainder must not round up.
        assert_eq!(display_minutes(30), 0);
        assert_eq!(display_minutes(31), 1);
        assert_eq!(display_minutes(90), 1);
        assert_eq!(display_minutes(91), 2);
        assert_eq!(display_minutes(600), 10);
        assert_eq!(display_minutes(605), 10);
    }
}
