//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, completion days as bare ISO
//! dates, UUIDs as hyphenated lowercase strings. Frequency and color reuse
//! the wire codecs from `tend-core`.

use chrono::{DateTime, NaiveDate, Utc};
use tend_core::{
  habit::{Frequency, Habit, HexColor},
  user::User,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_day(day: NaiveDate) -> String {
  day.format("%Y-%m-%d").to_string()
}

pub fn decode_day(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawHabit::from_row`].
pub const HABIT_COLUMNS: &str = "habit_id, owner_id, title, description, \
   frequency, category, color, created_at, updated_at";

/// Raw strings read directly from a `habits` row.
pub struct RawHabit {
  pub habit_id:    String,
  pub owner_id:    String,
  pub title:       String,
  pub description: String,
  pub frequency:   String,
  pub category:    String,
  pub color:       String,
  pub created_at:  String,
  pub updated_at:  String,
}

impl RawHabit {
  /// Map a row selected with [`HABIT_COLUMNS`], in that column order.
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      habit_id:    row.get(0)?,
      owner_id:    row.get(1)?,
      title:       row.get(2)?,
      description: row.get(3)?,
      frequency:   row.get(4)?,
      category:    row.get(5)?,
      color:       row.get(6)?,
      created_at:  row.get(7)?,
      updated_at:  row.get(8)?,
    })
  }

  pub fn into_habit(self) -> Result<Habit> {
    Ok(Habit {
      id:          decode_uuid(&self.habit_id)?,
      owner_id:    decode_uuid(&self.owner_id)?,
      title:       self.title,
      description: self.description,
      frequency:   Frequency::parse(&self.frequency)?,
      category:    self.category,
      color:       HexColor::parse(&self.color)?,
      created_at:  decode_dt(&self.created_at)?,
      updated_at:  decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read directly from a `users` row.
pub struct RawUser {
  pub user_id:       String,
  pub email:         String,
  pub password_hash: String,
  pub created_at:    String,
}

impl RawUser {
  pub fn into_user(self) -> Result<User> {
    Ok(User {
      id:            decode_uuid(&self.user_id)?,
      email:         self.email,
      password_hash: self.password_hash,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}

