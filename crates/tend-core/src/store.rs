//! The `HabitStore` and `AuthStore` traits.
//!
//! Implemented by storage backends (e.g. `tend-store-sqlite`). Higher layers
//! (`tend-api`, `tend-cli`) depend on these abstractions, not on any
//! concrete backend.

use std::future::Future;

use chrono::{Duration, NaiveDate};
use uuid::Uuid;

use crate::{
  dates::DateSet,
  habit::{Habit, HabitInput},
  user::{Session, User},
};

// ─── Habits ──────────────────────────────────────────────────────────────────

/// Abstraction over habit and completion-day storage.
///
/// Every operation is scoped to an owner: a habit another user owns behaves
/// exactly like one that does not exist, so callers cannot probe for foreign
/// ids. Habit reads return the metadata envelope only; the completion-day
/// set travels through the `*_completion` operations.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait HabitStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Create and persist a habit owned by `owner`. Ids and timestamps are
  /// assigned by the store.
  fn create_habit(
    &self,
    owner: Uuid,
    input: HabitInput,
  ) -> impl Future<Output = Result<Habit, Self::Error>> + Send + '_;

  /// All habits owned by `owner`, newest first.
  fn list_habits(
    &self,
    owner: Uuid,
  ) -> impl Future<Output = Result<Vec<Habit>, Self::Error>> + Send + '_;

  /// Retrieve one habit. `None` when the id is absent or owned by someone
  /// else; callers cannot tell the two apart.
  fn get_habit(
    &self,
    owner: Uuid,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Habit>, Self::Error>> + Send + '_;

  /// Replace all five draft fields and bump `updated_at`. The completion
  /// history is untouched.
  fn update_habit(
    &self,
    owner: Uuid,
    id: Uuid,
    input: HabitInput,
  ) -> impl Future<Output = Result<Option<Habit>, Self::Error>> + Send + '_;

  /// Delete a habit and its entire completion history with it. Returns
  /// `false` when nothing matched.
  fn delete_habit(
    &self,
    owner: Uuid,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// The habit's completion-day set, oldest first.
  fn get_completions(
    &self,
    owner: Uuid,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<DateSet>, Self::Error>> + Send + '_;

  /// Mark `day` complete. Idempotent; returns the updated set.
  fn add_completion(
    &self,
    owner: Uuid,
    id: Uuid,
    day: NaiveDate,
  ) -> impl Future<Output = Result<Option<DateSet>, Self::Error>> + Send + '_;

  /// Unmark `day`. Remove-if-present; returns the updated set.
  fn remove_completion(
    &self,
    owner: Uuid,
    id: Uuid,
    day: NaiveDate,
  ) -> impl Future<Output = Result<Option<DateSet>, Self::Error>> + Send + '_;
}

// ─── Accounts and sessions ───────────────────────────────────────────────────

/// Abstraction over account and session storage.
///
/// Sessions are keyed by the SHA-256 digest of the opaque client token;
/// the raw token never reaches a store.
pub trait AuthStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Create an account. Fails when the email is already registered.
  /// `email` must already be normalised (see
  /// [`crate::user::validate_credentials`]).
  fn create_user(
    &self,
    email: String,
    password_hash: String,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Look an account up by its normalised email.
  fn find_user<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  fn get_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Issue a session valid for `ttl` from now.
  fn create_session(
    &self,
    user_id: Uuid,
    token_hash: String,
    ttl: Duration,
  ) -> impl Future<Output = Result<Session, Self::Error>> + Send + '_;

  /// The user a live session resolves to; `None` when the token is unknown
  /// or the session has expired.
  fn resolve_session<'a>(
    &'a self,
    token_hash: &'a str,
  ) -> impl Future<Output = Result<Option<Uuid>, Self::Error>> + Send + 'a;

  /// Revoke a session. Returns `false` when the token was unknown.
  fn delete_session<'a>(
    &'a self,
    token_hash: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;
}
