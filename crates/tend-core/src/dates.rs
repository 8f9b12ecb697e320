//! Completion days — calendar-day set semantics.
//!
//! A habit's history is a set of bare calendar days, never a sequence of
//! timestamps. Marking a day twice is a no-op, unmarking is
//! remove-if-present, and iteration is always in ascending calendar order.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── DateSet ─────────────────────────────────────────────────────────────────

/// An ordered, duplicate-free set of completion days.
///
/// Serialises as a sorted array of ISO dates (`["2024-01-01", "2024-01-03"]`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DateSet(BTreeSet<NaiveDate>);

impl DateSet {
  pub fn new() -> Self { Self(BTreeSet::new()) }

  /// Idempotent insert. Returns `true` if the day was not already present.
  pub fn insert(&mut self, day: NaiveDate) -> bool { self.0.insert(day) }

  /// Remove-if-present. Returns `true` if the day was present.
  pub fn remove(&mut self, day: NaiveDate) -> bool { self.0.remove(&day) }

  pub fn contains(&self, day: NaiveDate) -> bool { self.0.contains(&day) }

  pub fn len(&self) -> usize { self.0.len() }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  /// The most recent day in the set, if any.
  pub fn latest(&self) -> Option<NaiveDate> {
    self.0.iter().next_back().copied()
  }

  /// Ascending calendar order. The iterator is double-ended, so `.rev()`
  /// walks newest-first.
  pub fn iter(&self) -> impl DoubleEndedIterator<Item = NaiveDate> + '_ {
    self.0.iter().copied()
  }
}

impl FromIterator<NaiveDate> for DateSet {
  fn from_iter<I: IntoIterator<Item = NaiveDate>>(iter: I) -> Self {
    Self(iter.into_iter().collect())
  }
}

impl Extend<NaiveDate> for DateSet {
  fn extend<I: IntoIterator<Item = NaiveDate>>(&mut self, iter: I) {
    self.0.extend(iter);
  }
}

// ─── Parsing ─────────────────────────────────────────────────────────────────

/// Parse a wire value into a calendar day.
///
/// Accepts a bare ISO date (`2024-01-03`) or a full RFC 3339 timestamp. For
/// a timestamp the day is the one written in the value, in its own offset;
/// time-of-day and offset are discarded, never re-projected into another
/// zone.
pub fn parse_day(raw: &str) -> Result<NaiveDate> {
  if let Ok(day) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
    return Ok(day);
  }
  DateTime::parse_from_rfc3339(raw)
    .map(|ts| ts.date_naive())
    .map_err(|_| Error::MalformedDay(raw.to_string()))
}
