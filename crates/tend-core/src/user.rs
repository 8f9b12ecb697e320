//! User accounts, sessions, and credential validation.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::habit::ValidationError;

/// A registered account. Only the argon2 PHC string is ever stored; the
/// password itself never crosses the hashing boundary.
#[derive(Debug, Clone)]
pub struct User {
  pub id:            Uuid,
  /// Lowercased at registration; unique within a store.
  pub email:         String,
  pub password_hash: String,
  pub created_at:    DateTime<Utc>,
}

/// A server-held session. `token_hash` is the SHA-256 hex digest of the
/// opaque token handed to the client; the raw token is never stored.
#[derive(Debug, Clone)]
pub struct Session {
  pub token_hash: String,
  pub user_id:    Uuid,
  pub created_at: DateTime<Utc>,
  pub expires_at: DateTime<Utc>,
}

/// Check a registration or login request. Returns the normalised
/// (trimmed, lowercased) email on success.
pub fn validate_credentials(
  email: &str,
  password: &str,
) -> Result<String, ValidationError> {
  let email = email.trim().to_lowercase();
  let well_formed = match email.split_once('@') {
    Some((local, domain)) => {
      !local.is_empty() && !domain.is_empty() && !domain.starts_with('.')
    }
    None => false,
  };
  if !well_formed {
    return Err(ValidationError::EmailInvalid);
  }
  if password.chars().count() < 8 {
    return Err(ValidationError::PasswordLength);
  }
  Ok(email)
}
