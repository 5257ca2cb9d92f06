//! Deadline-based session countdown.
//!
//! The countdown never decrements a counter: every tick recomputes the remaining
//! time from the stored deadline, so late or skipped ticks do not drift.

use chrono::{DateTime, Duration, Utc};

/// Remaining time at or below which the countdown reports a warning.
pub const WARNING_THRESHOLD_SECS: u64 = 30;

/// What a single tick observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Countdown is unlimited, stopped or already expired.
    Idle,
    /// Still running.
    Running { remaining_secs: u64, warning: bool },
    /// First tick at or below the warning threshold.
    WarningEntered { remaining_secs: u64 },
    /// The deadline passed on this tick. Reported once.
    Expired,
}

/// Formatted remaining time for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerDisplay {
    pub remaining_secs: u64,
    pub text: String,
    pub warning: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Countdown {
    deadline: Option<DateTime<Utc>>,
    ticking: bool,
    warned: bool,
    expired: bool,
    /// Remaining seconds captured when the countdown was stopped early.
    frozen_secs: Option<u64>,
}

impl Countdown {
    /// A countdown that never expires.
    #[must_use]
    pub fn unlimited() -> Self {
        Self::default()
    }

    /// Start counting down `limit_secs` from `now`. Zero means unlimited.
    #[must_use]
    pub fn start(limit_secs: u64, now: DateTime<Utc>) -> Self {
        if limit_secs == 0 {
            return Self::unlimited();
        }
        let limit = i64::try_from(limit_secs).unwrap_or(i64::MAX);
        Self {
            deadline: now.checked_add_signed(Duration::seconds(limit)),
            ticking: true,
            warned: false,
            expired: false,
            frozen_secs: None,
        }
    }

    #[must_use]
    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.deadline
    }

    /// True while ticks can still expire the countdown.
    #[must_use]
    pub fn is_ticking(&self) -> bool {
        self.ticking
    }

    #[must_use]
    pub fn is_warning(&self) -> bool {
        self.warned
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expired
    }

    /// Whole seconds left, rounded up. `None` for an unlimited countdown.
    #[must_use]
    pub fn remaining_secs(&self, now: DateTime<Utc>) -> Option<u64> {
        let deadline = self.deadline?;
        let millis = (deadline - now).num_milliseconds();
        if millis <= 0 {
            return Some(0);
        }
        Some(u64::try_from(millis).map_or(u64::MAX, |ms| ms.div_ceil(1000)))
    }

    /// Recompute the remaining time and update warning/expiry state.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Tick {
        if !self.ticking {
            return Tick::Idle;
        }
        let Some(remaining_secs) = self.remaining_secs(now) else {
            return Tick::Idle;
        };

        if remaining_secs == 0 {
            self.ticking = false;
            self.expired = true;
            return Tick::Expired;
        }

        if remaining_secs <= WARNING_THRESHOLD_SECS && !self.warned {
            self.warned = true;
            return Tick::WarningEntered { remaining_secs };
        }

        Tick::Running {
            remaining_secs,
            warning: self.warned,
        }
    }

    /// Cancel ticking and freeze the displayed remaining time at `now`.
    pub fn stop(&mut self, now: DateTime<Utc>) {
        if self.ticking {
            self.frozen_secs = self.remaining_secs(now);
        }
        self.ticking = false;
    }

    #[must_use]
    pub fn display(&self, now: DateTime<Utc>) -> Option<TimerDisplay> {
        let remaining_secs = if self.expired {
            0
        } else if let Some(frozen) = self.frozen_secs {
            frozen
        } else {
            self.remaining_secs(now)?
        };
        Some(TimerDisplay {
            remaining_secs,
            text: format_mm_ss(remaining_secs),
            warning: self.warned,
        })
    }
}

/// `mm:ss`, with minutes allowed past 59 (e.g. `"60:00"`).
#[must_use]
pub fn format_mm_ss(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn zero_limit_is_unlimited() {
        let mut countdown = Countdown::start(0, fixed_now());
        assert!(!countdown.is_ticking());
        assert_eq!(countdown.remaining_secs(fixed_now()), None);
        assert_eq!(countdown.tick(fixed_now() + Duration::hours(5)), Tick::Idle);
        assert!(countdown.display(fixed_now()).is_none());
    }

    #[test]
    fn remaining_rounds_up_partial_seconds() {
        let start = fixed_now();
        let countdown = Countdown::start(60, start);
        assert_eq!(countdown.remaining_secs(start), Some(60));
        assert_eq!(
            countdown.remaining_secs(start + Duration::milliseconds(500)),
            Some(60)
        );
        assert_eq!(
            countdown.remaining_secs(start + Duration::milliseconds(1001)),
            Some(59)
        );
        assert_eq!(countdown.remaining_secs(start + Duration::seconds(90)), Some(0));
    }

    #[test]
    fn warning_entered_once_then_sticky() {
        let start = fixed_now();
        let mut countdown = Countdown::start(300, start);

        assert_eq!(
            countdown.tick(start + Duration::seconds(10)),
            Tick::Running {
                remaining_secs: 290,
                warning: false
            }
        );
        assert_eq!(
            countdown.tick(start + Duration::seconds(270)),
            Tick::WarningEntered { remaining_secs: 30 }
        );
        assert_eq!(
            countdown.tick(start + Duration::seconds(280)),
            Tick::Running {
                remaining_secs: 20,
                warning: true
            }
        );
        assert!(countdown.is_warning());
    }

    #[test]
    fn expiry_reported_exactly_once() {
        let start = fixed_now();
        let mut countdown = Countdown::start(1, start);

        assert_eq!(countdown.tick(start + Duration::seconds(1)), Tick::Expired);
        assert!(countdown.is_expired());
        assert!(!countdown.is_ticking());
        assert_eq!(countdown.tick(start + Duration::seconds(2)), Tick::Idle);
    }

    #[test]
    fn late_tick_still_expires() {
        let start = fixed_now();
        let mut countdown = Countdown::start(300, start);
        assert_eq!(countdown.tick(start + Duration::seconds(900)), Tick::Expired);
    }

    #[test]
    fn stop_cancels_expiry() {
        let start = fixed_now();
        let mut countdown = Countdown::start(1, start);
        countdown.stop(start);
        assert_eq!(countdown.tick(start + Duration::seconds(5)), Tick::Idle);
        assert!(!countdown.is_expired());
    }

    #[test]
    fn stopped_display_is_frozen() {
        let start = fixed_now();
        let mut countdown = Countdown::start(300, start);
        countdown.stop(start + Duration::seconds(100));
        countdown.stop(start + Duration::seconds(150));

        let later = countdown.display(start + Duration::seconds(250)).unwrap();
        assert_eq!(later.remaining_secs, 200);
        assert_eq!(later.text, "03:20");
    }

    #[test]
    fn display_formats_minutes_and_seconds() {
        let start = fixed_now();
        let countdown = Countdown::start(600, start);
        let display = countdown.display(start + Duration::seconds(13)).unwrap();
        assert_eq!(display.text, "09:47");
        assert!(!display.warning);

        assert_eq!(format_mm_ss(3600), "60:00");
        assert_eq!(format_mm_ss(5), "00:05");
    }
}
