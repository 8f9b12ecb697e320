//! Habit types — the tracked routine and its boundary validation.
//!
//! A habit is a small metadata envelope; the completion-day history lives
//! apart from it (see [`crate::dates::DateSet`]) and travels through its own
//! store operations. Every create/update request passes through
//! [`HabitDraft::validate`] before any domain logic or storage is touched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::{Error, Result};

// ─── Frequency ───────────────────────────────────────────────────────────────

/// The intended cadence of a habit. Advisory metadata only: the streak and
/// rate computations never consult it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
  Daily,
  Weekly,
  Weekdays,
  Weekends,
}

impl Frequency {
  /// The string stored in the `frequency` column and accepted on the wire.
  /// Must match the `rename_all = "lowercase"` serde tags above.
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Daily => "daily",
      Self::Weekly => "weekly",
      Self::Weekdays => "weekdays",
      Self::Weekends => "weekends",
    }
  }

  pub fn parse(raw: &str) -> Result<Self> {
    match raw {
      "daily" => Ok(Self::Daily),
      "weekly" => Ok(Self::Weekly),
      "weekdays" => Ok(Self::Weekdays),
      "weekends" => Ok(Self::Weekends),
      other => Err(Error::UnknownFrequency(other.to_string())),
    }
  }
}

// ─── HexColor ────────────────────────────────────────────────────────────────

/// A CSS hex color, `#RGB` or `#RRGGBB`. Stored exactly as entered; digit
/// case is preserved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HexColor(String);

impl HexColor {
  pub fn parse(raw: &str) -> Result<Self> {
    let digits = raw
      .strip_prefix('#')
      .ok_or_else(|| Error::InvalidColor(raw.to_string()))?;
    let well_formed = matches!(digits.len(), 3 | 6)
      && digits.bytes().all(|b| b.is_ascii_hexdigit());
    if !well_formed {
      return Err(Error::InvalidColor(raw.to_string()));
    }
    Ok(Self(raw.to_string()))
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

// ─── Habit ───────────────────────────────────────────────────────────────────

/// A tracked routine, visible only to its owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Habit {
  pub id:          Uuid,
  pub owner_id:    Uuid,
  pub title:       String,
  pub description: String,
  pub frequency:   Frequency,
  /// Free-form grouping label, e.g. "health" or "learning".
  pub category:    String,
  pub color:       HexColor,
  pub created_at:  DateTime<Utc>,
  pub updated_at:  DateTime<Utc>,
}

// ─── Drafts and validation ───────────────────────────────────────────────────

/// A boundary-validation failure, tagged with the request field at fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
  #[error("title must be between 1 and 100 characters")]
  TitleLength,

  #[error("description must not be empty")]
  DescriptionEmpty,

  #[error("frequency must be one of: daily, weekly, weekdays, weekends")]
  FrequencyUnknown,

  #[error("category must not be empty")]
  CategoryEmpty,

  #[error("color must be a 3- or 6-digit hex value such as #10b981")]
  ColorInvalid,

  #[error("date must be a calendar day (2024-01-03) or an RFC 3339 timestamp")]
  DayMalformed,

  #[error("email address is not valid")]
  EmailInvalid,

  #[error("password must be at least 8 characters")]
  PasswordLength,
}

impl ValidationError {
  /// The request field this error refers to.
  pub fn field(&self) -> &'static str {
    match self {
      Self::TitleLength => "title",
      Self::DescriptionEmpty => "description",
      Self::FrequencyUnknown => "frequency",
      Self::CategoryEmpty => "category",
      Self::ColorInvalid => "color",
      Self::DayMalformed => "date",
      Self::EmailInvalid => "email",
      Self::PasswordLength => "password",
    }
  }
}

/// The wire shape accepted by habit create and update. All five fields are
/// mandatory; update is a full replacement, not a patch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HabitDraft {
  pub title:       String,
  pub description: String,
  pub frequency:   String,
  pub category:    String,
  pub color:       String,
}

/// A draft that has passed boundary validation. This is the only way to hand
/// habit fields to a store.
#[derive(Debug, Clone)]
pub struct HabitInput {
  pub title:       String,
  pub description: String,
  pub frequency:   Frequency,
  pub category:    String,
  pub color:       HexColor,
}

impl HabitDraft {
  /// Check every field and parse the typed ones. Text fields are trimmed
  /// before the length checks, so whitespace-only input is rejected as
  /// empty.
  pub fn validate(self) -> Result<HabitInput, ValidationError> {
    let title = self.title.trim().to_string();
    if title.is_empty() || title.chars().count() > 100 {
      return Err(ValidationError::TitleLength);
    }

    let description = self.description.trim().to_string();
    if description.is_empty() {
      return Err(ValidationError::DescriptionEmpty);
    }

    let frequency = Frequency::parse(&self.frequency)
      .map_err(|_| ValidationError::FrequencyUnknown)?;

    let category = self.category.trim().to_string();
    if category.is_empty() {
      return Err(ValidationError::CategoryEmpty);
    }

    let color = HexColor::parse(&self.color)
      .map_err(|_| ValidationError::ColorInvalid)?;

    Ok(HabitInput { title, description, frequency, category, color })
  }
}
