//! Error types for `tend-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("malformed calendar day: {0:?}")]
  MalformedDay(String),

  #[error("unknown frequency: {0:?}")]
  UnknownFrequency(String),

  #[error("invalid hex color: {0:?}")]
  InvalidColor(String),

  #[error("completion-rate window must cover at least one day")]
  EmptyWindow,

  #[error("no such calendar month: {year:04}-{month:02}")]
  NoSuchMonth { year: i32, month: u32 },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
