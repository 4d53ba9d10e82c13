//! Remaining-time breakdown for a countdown target.
//!
//! Every tick recomputes from the wall clock, so there is no accumulated
//! drift and no pause/resume state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const MS_PER_SECOND: i64 = 1_000;
const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;

/// Time left until a target, floor-divided into calendar-free units.
///
/// All fields are zero once the target has been reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Countdown {
    pub days: u64,
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
}

impl Countdown {
    /// The all-zero countdown shown once an event has started.
    pub const ZERO: Self = Self {
        days: 0,
        hours: 0,
        minutes: 0,
        seconds: 0,
    };

    /// Break a millisecond delta into units. Non-positive deltas yield zero.
    #[must_use]
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    pub const fn from_millis(delta_ms: i64) -> Self {
        if delta_ms <= 0 {
            return Self::ZERO;
        }
        // delta_ms > 0, and the modulo bounds keep the narrower fields in range
        Self {
            days: (delta_ms / MS_PER_DAY) as u64,
            hours: ((delta_ms / MS_PER_HOUR) % 24) as u8,
            minutes: ((delta_ms / MS_PER_MINUTE) % 60) as u8,
            seconds: ((delta_ms / MS_PER_SECOND) % 60) as u8,
        }
    }

    /// Whole seconds remaining.
    #[must_use]
    pub const fn total_seconds(&self) -> u64 {
        self.days * 86_400 + self.hours as u64 * 3_600 + self.minutes as u64 * 60 + self.seconds as u64
    }
}

/// Compute the countdown from `now` to `target`.
#[must_use]
pub fn remaining(target: DateTime<Utc>, now: DateTime<Utc>) -> Countdown {
    Countdown::from_millis((target - now).num_milliseconds())
}

/// A countdown together with the target it was computed for.
///
/// This is the payload served by the countdown API and stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountdownSnapshot {
    pub event_date: DateTime<Utc>,
    #[serde(flatten)]
    pub remaining: Countdown,
    pub expired: bool,
}

impl CountdownSnapshot {
    /// Snapshot the countdown for `target` at `now`.
    ///
    /// `expired` flips at the target instant itself. During the final
    /// partial second the countdown already reads zero but is not expired.
    #[must_use]
    pub fn at(target: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        Self {
            event_date: target,
            remaining: remaining(target, now),
            expired: target <= now,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_breakdown() {
        let now = base();
        let target = now
            + Duration::days(3)
            + Duration::hours(4)
            + Duration::minutes(5)
            + Duration::seconds(6)
            + Duration::milliseconds(999);
        assert_eq!(
            remaining(target, now),
            Countdown {
                days: 3,
                hours: 4,
                minutes: 5,
                seconds: 6
            }
        );
    }

    #[test]
    fn test_past_and_present_targets_are_zero_and_expired() {
        let now = base();
        for offset in [0, -1, -1_000, -86_400_000] {
            let snapshot = CountdownSnapshot::at(now + Duration::milliseconds(offset), now);
            assert_eq!(snapshot.remaining, Countdown::ZERO);
            assert!(snapshot.expired);
        }
    }

    #[test]
    fn test_final_partial_second_reads_zero_but_is_not_expired() {
        let now = base();
        for offset in [1, 500, 999] {
            let snapshot = CountdownSnapshot::at(now + Duration::milliseconds(offset), now);
            assert_eq!(snapshot.remaining, Countdown::ZERO);
            assert!(!snapshot.expired, "expired {offset}ms early");
        }
    }

    #[test]
    fn test_monotonic_until_zero_exactly_once() {
        let now = base();
        let target = now + Duration::seconds(90);
        let mut previous = remaining(target, now).total_seconds();
        let mut zero_transitions = 0;

        for tick in 1..=120 {
            let c = remaining(target, now + Duration::seconds(tick));
            let current = c.total_seconds();
            assert!(current <= previous, "countdown went up at tick {tick}");
            if previous > 0 && current == 0 {
                zero_transitions += 1;
            }
            if previous > 0 {
                assert_eq!(previous - current, 1);
            }
            previous = current;
        }

        assert_eq!(zero_transitions, 1);
        assert_eq!(previous, 0);
    }

    #[test]
    fn test_launch_scenario() {
        let created = base();
        let target = created + Duration::days(2);
        let snapshot = CountdownSnapshot::at(target, created);
        assert_eq!(snapshot.remaining.days, 2);
        assert!(!snapshot.expired);

        let later = CountdownSnapshot::at(target, created + Duration::days(2));
        assert_eq!(later.remaining, Countdown::ZERO);
        assert!(later.expired);
    }

    #[test]
    fn test_snapshot_serializes_flat() {
        let now = base();
        let snapshot = CountdownSnapshot::at(now + Duration::hours(1), now);
        let json = serde_json::to_value(snapshot).unwrap();
        assert_eq!(json["hours"], 1);
        assert_eq!(json["days"], 0);
        assert_eq!(json["expired"], false);
    }
}
