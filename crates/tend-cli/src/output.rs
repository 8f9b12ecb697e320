//! Table and calendar rendering for the terminal.

use std::fmt::Write as _;

use anyhow::Result;
use chrono::{Datelike as _, NaiveDate};
use comfy_table::{
  Attribute, Cell, Color, ContentArrangement, Table, presets::UTF8_FULL,
};
use tend_core::{
  calendar::{month_grid, month_stats},
  dates::DateSet,
  habit::Habit,
};

use crate::client::HabitStats;

/// One row of `tend list`: a habit plus its derived numbers.
pub struct HabitSummary {
  pub habit:  Habit,
  pub today:  bool,
  pub streak: u32,
  pub rate:   u8,
}

/// Render the habit list as a table.
pub fn habit_table(summaries: &[HabitSummary]) -> Table {
  let mut table = Table::new();
  table
    .load_preset(UTF8_FULL)
    .set_content_arrangement(ContentArrangement::Dynamic)
    .set_header(vec![
      Cell::new("ID").add_attribute(Attribute::Bold),
      Cell::new("Title").add_attribute(Attribute::Bold),
      Cell::new("Frequency").add_attribute(Attribute::Bold),
      Cell::new("Category").add_attribute(Attribute::Bold),
      Cell::new("Today").add_attribute(Attribute::Bold),
      Cell::new("Streak").add_attribute(Attribute::Bold),
      Cell::new("Rate (30d)").add_attribute(Attribute::Bold),
    ]);

  for summary in summaries {
    let today = if summary.today { "done" } else { "-" };
    let today_color = if summary.today { Color::Green } else { Color::Grey };
    let streak_color =
      if summary.streak > 0 { Color::Green } else { Color::Grey };

    table.add_row(vec![
      Cell::new(summary.habit.id),
      Cell::new(&summary.habit.title),
      Cell::new(summary.habit.frequency.as_str()),
      Cell::new(&summary.habit.category),
      Cell::new(today).fg(today_color),
      Cell::new(summary.streak).fg(streak_color),
      Cell::new(format!("{}%", summary.rate)),
    ]);
  }

  table
}

/// Render the `tend show` header block.
pub fn habit_details(habit: &Habit, stats: &HabitStats) -> String {
  let today = if stats.completed_today { "done" } else { "not yet" };
  let mut out = String::new();
  let _ = writeln!(out, "{} ({})", habit.title, habit.frequency.as_str());
  let _ = writeln!(out, "  {}", habit.description);
  let _ = writeln!(
    out,
    "  category {} | color {}",
    habit.category,
    habit.color.as_str()
  );
  let _ = writeln!(
    out,
    "  streak {} | rate {}% over {} days | today: {today}",
    stats.streak, stats.completion_rate, stats.window_days
  );
  out
}

/// Render a Sunday-first calendar for one month, bracketing completed days.
pub fn month_view(
  days: &DateSet,
  year: i32,
  month: u32,
  today: NaiveDate,
) -> Result<String> {
  let grid = month_grid(year, month)?;
  let stats = month_stats(days, year, month, today)?;

  let title = NaiveDate::from_ymd_opt(year, month, 1)
    .map(|first| first.format("%B %Y").to_string())
    .unwrap_or_default();

  let mut out = String::new();
  let _ = writeln!(out, "{title:^28}");
  let _ = writeln!(out, "  Su  Mo  Tu  We  Th  Fr  Sa");
  for week in grid.weeks() {
    let mut line = String::new();
    for cell in week {
      match cell {
        Some(day) if days.contains(day) => {
          let _ = write!(line, "[{:>2}]", day.day());
        }
        Some(day) => {
          let _ = write!(line, " {:>2} ", day.day());
        }
        None => line.push_str("    "),
      }
    }
    let _ = writeln!(out, "{}", line.trim_end());
  }
  let _ = writeln!(
    out,
    "{}/{} days this month ({}%)",
    stats.completed, stats.total, stats.percentage
  );
  Ok(out)
}
