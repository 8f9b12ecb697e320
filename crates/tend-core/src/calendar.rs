//! Month-view helpers — the calendar grid and per-month statistics.
//!
//! Kept in core so every client lays a month out the same way: a
//! seven-column, Sunday-first grid with leading blanks before the first of
//! the month.

use chrono::{Datelike, NaiveDate};

use crate::{Error, Result, dates::DateSet};

// ─── Grid ────────────────────────────────────────────────────────────────────

/// One month laid out for a seven-column calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGrid {
  pub year:  i32,
  pub month: u32,
  /// Day cells in display order. Leading `None` slots pad the first week so
  /// that `index % 7` is always the weekday column, with Sunday in column
  /// zero.
  pub cells: Vec<Option<NaiveDate>>,
}

impl MonthGrid {
  /// Rows of seven cells; the last row is padded with `None`.
  pub fn weeks(&self) -> impl Iterator<Item = [Option<NaiveDate>; 7]> + '_ {
    let mut cells = self.cells.clone();
    while cells.len() % 7 != 0 {
      cells.push(None);
    }
    (0..cells.len() / 7).map(move |row| {
      let mut week = [None; 7];
      week.copy_from_slice(&cells[row * 7..row * 7 + 7]);
      week
    })
  }
}

/// Number of days in `month` of `year`. Errors on a nonsense month.
pub fn days_in_month(year: i32, month: u32) -> Result<u32> {
  let (next_y, next_m) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
  NaiveDate::from_ymd_opt(next_y, next_m, 1)
    .and_then(|first| first.pred_opt())
    .map(|last| last.day())
    .ok_or(Error::NoSuchMonth { year, month })
}

/// Lay out a month for display.
pub fn month_grid(year: i32, month: u32) -> Result<MonthGrid> {
  let first = NaiveDate::from_ymd_opt(year, month, 1)
    .ok_or(Error::NoSuchMonth { year, month })?;

  let lead = first.weekday().num_days_from_sunday() as usize;
  let mut cells: Vec<Option<NaiveDate>> = vec![None; lead];

  let mut cursor = first;
  loop {
    cells.push(Some(cursor));
    match cursor.succ_opt() {
      Some(next) if next.month() == month => cursor = next,
      _ => break,
    }
  }

  Ok(MonthGrid { year, month, cells })
}

// ─── Stats ───────────────────────────────────────────────────────────────────

/// Completion statistics for one displayed month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthStats {
  /// Days of the month marked complete.
  pub completed:  u32,
  /// Days counted against: the elapsed days when the month is the one
  /// `today` falls in, the full month otherwise.
  pub total:      u32,
  pub percentage: u32,
}

/// Statistics for the month as displayed. An in-progress month is measured
/// against the days elapsed so far, not the days it will eventually have.
pub fn month_stats(
  dates: &DateSet,
  year: i32,
  month: u32,
  today: NaiveDate,
) -> Result<MonthStats> {
  let completed = dates
    .iter()
    .filter(|d| d.year() == year && d.month() == month)
    .count() as u32;

  let total = if today.year() == year && today.month() == month {
    today.day()
  } else {
    days_in_month(year, month)?
  };

  let percentage = (f64::from(completed) / f64::from(total) * 100.0).round() as u32;

  Ok(MonthStats { completed, total, percentage })
}

#[cfg(test)]
mod tests {
  use super::*;

  fn day(s: &str) -> NaiveDate { s.parse().unwrap() }

  #[test]
  fn grid_pads_to_the_first_weekday() {
    // 2024-03-01 is a Friday, five columns in from Sunday.
    let grid = month_grid(2024, 3).unwrap();
    assert_eq!(&grid.cells[..5], &[None, None, None, None, None]);
    assert_eq!(grid.cells[5], Some(day("2024-03-01")));
    assert_eq!(grid.cells.len(), 5 + 31);
    assert_eq!(*grid.cells.last().unwrap(), Some(day("2024-03-31")));
  }

  #[test]
  fn grid_starts_flush_when_the_month_opens_on_sunday() {
    // 2024-09-01 is a Sunday.
    let grid = month_grid(2024, 9).unwrap();
    assert_eq!(grid.cells[0], Some(day("2024-09-01")));
    assert_eq!(grid.cells.len(), 30);
  }

  #[test]
  fn weekday_columns_line_up() {
    let grid = month_grid(2024, 3).unwrap();
    for (i, cell) in grid.cells.iter().enumerate() {
      if let Some(d) = cell {
        assert_eq!(d.weekday().num_days_from_sunday() as usize, i % 7);
      }
    }
  }

  #[test]
  fn weeks_are_padded_to_seven() {
    let grid = month_grid(2024, 3).unwrap();
    let weeks: Vec<_> = grid.weeks().collect();
    assert_eq!(weeks.len(), 6);
    assert_eq!(weeks[0][5], Some(day("2024-03-01")));
    assert_eq!(weeks[5][6], None);
  }

  #[test]
  fn leap_february_has_twenty_nine_days() {
    assert_eq!(days_in_month(2024, 2).unwrap(), 29);
    assert_eq!(days_in_month(2023, 2).unwrap(), 28);
    assert!(days_in_month(2024, 13).is_err());
  }

  #[test]
  fn stats_for_a_finished_month_use_its_full_length() {
    let dates: DateSet = (1..=10)
      .map(|d| NaiveDate::from_ymd_opt(2024, 2, d).unwrap())
      .collect();
    let stats = month_stats(&dates, 2024, 2, day("2024-03-15")).unwrap();
    assert_eq!(stats.completed, 10);
    assert_eq!(stats.total, 29);
    assert_eq!(stats.percentage, 34);
  }

  #[test]
  fn stats_for_the_current_month_use_elapsed_days() {
    let dates: DateSet =
      [day("2024-03-01"), day("2024-03-02")].into_iter().collect();
    let stats = month_stats(&dates, 2024, 3, day("2024-03-04")).unwrap();
    assert_eq!(stats.total, 4);
    assert_eq!(stats.percentage, 50);
  }

  #[test]
  fn stats_ignore_other_months() {
    let dates: DateSet =
      [day("2024-02-29"), day("2024-04-01")].into_iter().collect();
    let stats = month_stats(&dates, 2024, 3, day("2024-05-01")).unwrap();
    assert_eq!(stats.completed, 0);
    assert_eq!(stats.percentage, 0);
  }
}
