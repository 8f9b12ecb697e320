//! Completion statistics — pure derivations over a habit's day set.
//!
//! Everything here is stateless and side-effect free: each function takes
//! the relevant day set plus a reference day and returns a value. Nothing
//! touches storage or the wall clock, so callers are free to run these from
//! any number of tasks without coordination, and tests pin "today" to a
//! fixed date.

use chrono::{Days, NaiveDate};

use crate::{Error, Result, dates::DateSet};

/// Default trailing window for [`completion_rate`], in days.
pub const DEFAULT_RATE_WINDOW: u32 = 30;

/// Whether `day` is marked complete. Pure set membership; time-of-day never
/// enters into it.
pub fn completed_on(dates: &DateSet, day: NaiveDate) -> bool {
  dates.contains(day)
}

/// Length of the current unbroken run of consecutive days.
///
/// The run must reach `today` or `today - 1`: a miss today leaves
/// yesterday's streak intact, while two missed days reset it to zero. The
/// walk stops at the first gap, so history behind a break never counts.
pub fn current_streak(dates: &DateSet, today: NaiveDate) -> u32 {
  let Some(latest) = dates.latest() else {
    return 0;
  };

  let yesterday = today.checked_sub_days(Days::new(1));
  if latest != today && Some(latest) != yesterday {
    return 0;
  }

  let mut streak = 0;
  let mut expected = latest;
  for day in dates.iter().rev() {
    if day != expected {
      break;
    }
    streak += 1;
    match expected.checked_sub_days(Days::new(1)) {
      Some(prev) => expected = prev,
      None => break,
    }
  }
  streak
}

/// Percentage of the trailing `window` days that are marked complete,
/// rounded to the nearest integer.
///
/// The window is the `window` calendar days ending at `today`: days after
/// `today` and days at or before `today - window` are ignored. A
/// deduplicated set can therefore contribute at most `window` days, and the
/// result never exceeds 100.
pub fn completion_rate(
  dates: &DateSet,
  window: u32,
  today: NaiveDate,
) -> Result<u8> {
  if window == 0 {
    return Err(Error::EmptyWindow);
  }

  // Exclusive lower bound; `None` only when `today` underflows the calendar.
  let start = today.checked_sub_days(Days::new(u64::from(window)));
  let marked = dates
    .iter()
    .filter(|day| *day <= today && start.is_none_or(|s| *day > s))
    .count();

  let rate = (marked as f64 / f64::from(window) * 100.0).round() as u8;
  debug_assert!(rate <= 100);
  Ok(rate)
}
