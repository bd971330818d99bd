use chrono::{DateTime, Duration, Utc};

/// Where session start and attempt timestamps come from.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    /// Wall clock.
    #[default]
    System,
    /// Frozen at an instant; only `advance` moves it.
    Fixed(DateTime<Utc>),
}

impl Clock {
    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(at) => *at,
        }
    }

    /// Time spent since `since`, e.g. since a session started. Never negative.
    #[must_use]
    pub fn elapsed_since(&self, since: DateTime<Utc>) -> Duration {
        (self.now() - since).max(Duration::zero())
    }

    /// Step a frozen clock forward between answers. The wall clock ignores this.
    pub fn advance(&mut self, by: Duration) {
        if let Clock::Fixed(at) = self {
            *at += by;
        }
    }
}

/// Start instant for sessions stamped by [`frozen_clock`]: 2024-03-01T09:00:00Z.
pub const SESSION_EPOCH_SECS: i64 = 1_709_283_600;

#[must_use]
pub fn session_epoch() -> DateTime<Utc> {
    DateTime::from_timestamp(SESSION_EPOCH_SECS, 0).unwrap_or_default()
}

/// A clock frozen at [`session_epoch`], so session and attempt stamps are stable.
#[must_use]
pub fn frozen_clock() -> Clock {
    Clock::fixed(session_epoch())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_epoch_is_march_first() {
        assert_eq!(session_epoch().to_rfc3339(), "2024-03-01T09:00:00+00:00");
    }

    #[test]
    fn elapsed_tracks_advances_between_answers() {
        let mut clock = frozen_clock();
        let started = clock.now();
        clock.advance(Duration::seconds(40));
        clock.advance(Duration::seconds(50));
        assert_eq!(clock.elapsed_since(started), Duration::seconds(90));
    }

    #[test]
    fn elapsed_never_goes_negative() {
        let clock = frozen_clock();
        let later = session_epoch() + Duration::minutes(5);
        assert_eq!(clock.elapsed_since(later), Duration::zero());
    }

    #[test]
    fn wall_clock_ignores_advance() {
        let mut clock = Clock::System;
        clock.advance(Duration::days(365));
        assert!(clock.now() <= Utc::now());
    }
}
