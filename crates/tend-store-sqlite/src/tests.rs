//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{Duration, NaiveDate};
use tend_core::{
  habit::{Frequency, HabitInput, HexColor},
  store::{AuthStore, HabitStore},
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn user(s: &SqliteStore, email: &str) -> Uuid {
  s.create_user(email.into(), "$argon2id$fake".into())
    .await
    .unwrap()
    .id
}

fn input(title: &str) -> HabitInput {
  HabitInput {
    title:       title.into(),
    description: "twenty pages before bed".into(),
    frequency:   Frequency::Daily,
    category:    "learning".into(),
    color:       HexColor::parse("#10b981").unwrap(),
  }
}

fn day(s: &str) -> NaiveDate { s.parse().unwrap() }

// ─── Habits ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_habit() {
  let s = store().await;
  let owner = user(&s, "a@example.com").await;

  let habit = s.create_habit(owner, input("Read")).await.unwrap();
  assert_eq!(habit.owner_id, owner);
  assert_eq!(habit.frequency, Frequency::Daily);
  assert_eq!(habit.created_at, habit.updated_at);

  let fetched = s.get_habit(owner, habit.id).await.unwrap().unwrap();
  assert_eq!(fetched.id, habit.id);
  assert_eq!(fetched.title, "Read");
  assert_eq!(fetched.color.as_str(), "#10b981");
  assert_eq!(fetched.created_at, habit.created_at);
}

#[tokio::test]
async fn get_habit_missing_returns_none() {
  let s = store().await;
  let owner = user(&s, "a@example.com").await;
  assert!(s.get_habit(owner, Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn list_habits_newest_first() {
  let s = store().await;
  let owner = user(&s, "a@example.com").await;

  let first = s.create_habit(owner, input("First")).await.unwrap();
  let second = s.create_habit(owner, input("Second")).await.unwrap();
  let third = s.create_habit(owner, input("Third")).await.unwrap();

  let all = s.list_habits(owner).await.unwrap();
  let ids: Vec<_> = all.iter().map(|h| h.id).collect();
  assert_eq!(ids, vec![third.id, second.id, first.id]);
}

#[tokio::test]
async fn habits_are_scoped_to_their_owner() {
  let s = store().await;
  let alice = user(&s, "alice@example.com").await;
  let bob = user(&s, "bob@example.com").await;

  let habit = s.create_habit(alice, input("Read")).await.unwrap();
  s.create_habit(bob, input("Run")).await.unwrap();

  let alices = s.list_habits(alice).await.unwrap();
  assert_eq!(alices.len(), 1);
  assert_eq!(alices[0].title, "Read");

  // Bob sees Alice's habit as missing, on every operation.
  assert!(s.get_habit(bob, habit.id).await.unwrap().is_none());
  assert!(
    s.update_habit(bob, habit.id, input("Hijack"))
      .await
      .unwrap()
      .is_none()
  );
  assert!(!s.delete_habit(bob, habit.id).await.unwrap());
  assert!(s.get_completions(bob, habit.id).await.unwrap().is_none());

  let untouched = s.get_habit(alice, habit.id).await.unwrap().unwrap();
  assert_eq!(untouched.title, "Read");
}

#[tokio::test]
async fn update_replaces_all_fields() {
  let s = store().await;
  let owner = user(&s, "a@example.com").await;
  let habit = s.create_habit(owner, input("Read")).await.unwrap();

  let replacement = HabitInput {
    title:       "Run".into(),
    description: "five kilometres".into(),
    frequency:   Frequency::Weekdays,
    category:    "health".into(),
    color:       HexColor::parse("#f43f5e").unwrap(),
  };
  let updated = s
    .update_habit(owner, habit.id, replacement)
    .await
    .unwrap()
    .unwrap();

  assert_eq!(updated.id, habit.id);
  assert_eq!(updated.title, "Run");
  assert_eq!(updated.frequency, Frequency::Weekdays);
  assert_eq!(updated.color.as_str(), "#f43f5e");
  assert_eq!(updated.created_at, habit.created_at);
  assert!(updated.updated_at >= habit.updated_at);
}

#[tokio::test]
async fn update_missing_returns_none() {
  let s = store().await;
  let owner = user(&s, "a@example.com").await;
  let result = s.update_habit(owner, Uuid::new_v4(), input("X")).await.unwrap();
  assert!(result.is_none());
}

#[tokio::test]
async fn delete_removes_habit_and_history() {
  let s = store().await;
  let owner = user(&s, "a@example.com").await;
  let habit = s.create_habit(owner, input("Read")).await.unwrap();

  s.add_completion(owner, habit.id, day("2024-01-01")).await.unwrap();
  s.add_completion(owner, habit.id, day("2024-01-02")).await.unwrap();

  // Succeeds while completion rows exist only because they cascade.
  assert!(s.delete_habit(owner, habit.id).await.unwrap());
  assert!(s.get_habit(owner, habit.id).await.unwrap().is_none());
  assert!(s.get_completions(owner, habit.id).await.unwrap().is_none());

  // Second delete finds nothing.
  assert!(!s.delete_habit(owner, habit.id).await.unwrap());
}

// ─── Completions ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn new_habit_has_no_completions() {
  let s = store().await;
  let owner = user(&s, "a@example.com").await;
  let habit = s.create_habit(owner, input("Read")).await.unwrap();

  let days = s.get_completions(owner, habit.id).await.unwrap().unwrap();
  assert!(days.is_empty());
}

#[tokio::test]
async fn add_completion_is_idempotent() {
  let s = store().await;
  let owner = user(&s, "a@example.com").await;
  let habit = s.create_habit(owner, input("Read")).await.unwrap();

  let first = s
    .add_completion(owner, habit.id, day("2024-01-03"))
    .await
    .unwrap()
    .unwrap();
  assert_eq!(first.len(), 1);

  let second = s
    .add_completion(owner, habit.id, day("2024-01-03"))
    .await
    .unwrap()
    .unwrap();
  assert_eq!(second.len(), 1);
  assert!(second.contains(day("2024-01-03")));
}

#[tokio::test]
async fn completions_come_back_sorted() {
  let s = store().await;
  let owner = user(&s, "a@example.com").await;
  let habit = s.create_habit(owner, input("Read")).await.unwrap();

  for d in ["2024-03-01", "2024-01-01", "2024-02-01"] {
    s.add_completion(owner, habit.id, day(d)).await.unwrap();
  }

  let days = s.get_completions(owner, habit.id).await.unwrap().unwrap();
  let listed: Vec<_> = days.iter().collect();
  assert_eq!(
    listed,
    vec![day("2024-01-01"), day("2024-02-01"), day("2024-03-01")]
  );
}

#[tokio::test]
async fn remove_completion_is_remove_if_present() {
  let s = store().await;
  let owner = user(&s, "a@example.com").await;
  let habit = s.create_habit(owner, input("Read")).await.unwrap();

  s.add_completion(owner, habit.id, day("2024-01-03")).await.unwrap();

  let after = s
    .remove_completion(owner, habit.id, day("2024-01-03"))
    .await
    .unwrap()
    .unwrap();
  assert!(after.is_empty());

  // Removing a day that was never marked is not an error.
  let still = s
    .remove_completion(owner, habit.id, day("2024-01-03"))
    .await
    .unwrap()
    .unwrap();
  assert!(still.is_empty());
}

#[tokio::test]
async fn completion_write_bumps_updated_at() {
  let s = store().await;
  let owner = user(&s, "a@example.com").await;
  let habit = s.create_habit(owner, input("Read")).await.unwrap();

  s.add_completion(owner, habit.id, day("2024-01-03")).await.unwrap();

  let after = s.get_habit(owner, habit.id).await.unwrap().unwrap();
  assert!(after.updated_at >= habit.updated_at);
}

#[tokio::test]
async fn completions_on_missing_habit_return_none() {
  let s = store().await;
  let owner = user(&s, "a@example.com").await;

  let id = Uuid::new_v4();
  assert!(s.get_completions(owner, id).await.unwrap().is_none());
  assert!(
    s.add_completion(owner, id, day("2024-01-03"))
      .await
      .unwrap()
      .is_none()
  );
  assert!(
    s.remove_completion(owner, id, day("2024-01-03"))
      .await
      .unwrap()
      .is_none()
  );
}

// ─── Accounts ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_find_user() {
  let s = store().await;

  let created = s
    .create_user("ada@example.com".into(), "$argon2id$fake".into())
    .await
    .unwrap();
  assert_eq!(created.email, "ada@example.com");

  let found = s.find_user("ada@example.com").await.unwrap().unwrap();
  assert_eq!(found.id, created.id);
  assert_eq!(found.password_hash, "$argon2id$fake");

  let by_id = s.get_user(created.id).await.unwrap().unwrap();
  assert_eq!(by_id.email, "ada@example.com");
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
  let s = store().await;
  s.create_user("ada@example.com".into(), "h1".into())
    .await
    .unwrap();

  let err = s
    .create_user("ada@example.com".into(), "h2".into())
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::EmailTaken(_)));
}

#[tokio::test]
async fn find_unknown_user_returns_none() {
  let s = store().await;
  assert!(s.find_user("ghost@example.com").await.unwrap().is_none());
  assert!(s.get_user(Uuid::new_v4()).await.unwrap().is_none());
}

// ─── Sessions ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn session_round_trip() {
  let s = store().await;
  let uid = user(&s, "ada@example.com").await;

  let session = s
    .create_session(uid, "deadbeef".into(), Duration::days(30))
    .await
    .unwrap();
  assert_eq!(session.user_id, uid);
  assert!(session.expires_at > session.created_at);

  let resolved = s.resolve_session("deadbeef").await.unwrap();
  assert_eq!(resolved, Some(uid));
}

#[tokio::test]
async fn unknown_token_resolves_to_none() {
  let s = store().await;
  assert!(s.resolve_session("nope").await.unwrap().is_none());
}

#[tokio::test]
async fn expired_session_resolves_to_none() {
  let s = store().await;
  let uid = user(&s, "ada@example.com").await;

  s.create_session(uid, "stale".into(), Duration::seconds(-1))
    .await
    .unwrap();

  assert!(s.resolve_session("stale").await.unwrap().is_none());
}

#[tokio::test]
async fn delete_session_revokes_it() {
  let s = store().await;
  let uid = user(&s, "ada@example.com").await;

  s.create_session(uid, "tok".into(), Duration::days(30))
    .await
    .unwrap();

  assert!(s.delete_session("tok").await.unwrap());
  assert!(s.resolve_session("tok").await.unwrap().is_none());
  assert!(!s.delete_session("tok").await.unwrap());
}
