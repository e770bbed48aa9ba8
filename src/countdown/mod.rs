//! Live countdown to the next prayer.
//!
//! The engine is a pure function of (timings, wall clock); callers re-invoke
//! it on every tick (1 Hz) and it holds no state in between.

use chrono::{NaiveTime, Timelike};

use crate::models::{PrayerName, PrayerTimings};

const MINUTES_PER_DAY: u32 = 24 * 60;

/// Derived countdown snapshot; never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct CountdownState {
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
    pub next_prayer: PrayerName,
    pub next_prayer_arabic: &'static str,
    /// Raw "HH:MM" of the upcoming prayer.
    pub next_prayer_time: String,
    /// True when the target is tomorrow's Fajr.
    pub is_next_day: bool,
    /// Elapsed fraction of the window between the current and next prayer,
    /// in [0, 1].
    pub progress: f64,
}

impl CountdownState {
    pub fn total_seconds(&self) -> u32 {
        self.hours * 3600 + self.minutes * 60 + self.seconds
    }
}

/// Computes the countdown to the next prayer at wall-clock `now`.
///
/// Absent or malformed timing entries are skipped; when none remain the
/// result is `None` ("no data"), never Fajr arithmetic on zero timings.
pub fn tick(timings: &PrayerTimings, now: NaiveTime) -> Option<CountdownState> {
    let schedule = timings.ordered();
    if schedule.is_empty() {
        return None;
    }

    let now_minutes = now.hour() * 60 + now.minute();
    let now_seconds = now.num_seconds_from_midnight();

    // First prayer whose minute-of-day strictly exceeds the current one;
    // when all have passed the target wraps to tomorrow's first entry.
    let next_idx = schedule.iter().position(|(_, _, m)| *m > now_minutes);
    let is_next_day = next_idx.is_none();
    let next_idx = next_idx.unwrap_or(0);
    let (next_name, next_raw, next_minutes) = schedule[next_idx];

    let target_seconds = next_minutes * 60;
    let remaining = if is_next_day {
        MINUTES_PER_DAY * 60 - now_seconds + target_seconds
    } else {
        target_seconds - now_seconds
    };

    // The current prayer precedes the next one, wrapping to the last entry
    // when the next is the first (pre-Fajr or post-Isha).
    let current_idx = if next_idx == 0 {
        schedule.len() - 1
    } else {
        next_idx - 1
    };
    let (_, _, current_minutes) = schedule[current_idx];

    let elapsed = (now_minutes + MINUTES_PER_DAY - current_minutes) % MINUTES_PER_DAY;
    let window = (next_minutes + MINUTES_PER_DAY - current_minutes) % MINUTES_PER_DAY;
    let progress = if window == 0 {
        0.0
    } else {
        (elapsed as f64 / window as f64).clamp(0.0, 1.0)
    };

    Some(CountdownState {
        hours: remaining / 3600,
        minutes: (remaining % 3600) / 60,
        seconds: remaining % 60,
        next_prayer: next_name,
        next_prayer_arabic: next_name.name_arabic(),
        next_prayer_time: next_raw.to_string(),
        is_next_day,
        progress,
    })
}
