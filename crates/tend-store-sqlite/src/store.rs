//! [`SqliteStore`] — the SQLite implementation of [`HabitStore`] and
//! [`AuthStore`].

use std::path::Path;

use chrono::{Duration, NaiveDate, Utc};
use rusqlite::OptionalExtension as _;
use tend_core::{
  dates::DateSet,
  habit::{Habit, HabitInput},
  store::{AuthStore, HabitStore},
  user::{Session, User},
};
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{
    HABIT_COLUMNS, RawHabit, RawUser, decode_day, decode_uuid, encode_day,
    encode_dt, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Tend habit store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Row helpers ─────────────────────────────────────────────────────────────

/// True when `habit_id` exists and belongs to `owner_id`. Completion
/// operations gate on this so a foreign habit behaves like a missing one.
fn habit_owned(
  conn: &rusqlite::Connection,
  habit_id: &str,
  owner_id: &str,
) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row(
        "SELECT 1 FROM habits WHERE habit_id = ?1 AND owner_id = ?2",
        rusqlite::params![habit_id, owner_id],
        |_| Ok(true),
      )
      .optional()?
      .unwrap_or(false),
  )
}

/// All completion days for a habit, oldest first.
fn read_days(
  conn: &rusqlite::Connection,
  habit_id: &str,
) -> rusqlite::Result<Vec<String>> {
  let mut stmt = conn
    .prepare("SELECT day FROM completions WHERE habit_id = ?1 ORDER BY day")?;
  stmt
    .query_map(rusqlite::params![habit_id], |row| row.get(0))?
    .collect()
}

fn decode_days(days: Vec<String>) -> Result<DateSet> {
  days.iter().map(|s| decode_day(s)).collect()
}

// ─── HabitStore impl ─────────────────────────────────────────────────────────

impl HabitStore for SqliteStore {
  type Error = Error;

  async fn create_habit(&self, owner: Uuid, input: HabitInput) -> Result<Habit> {
    let now = Utc::now();
    let habit = Habit {
      id:          Uuid::new_v4(),
      owner_id:    owner,
      title:       input.title,
      description: input.description,
      frequency:   input.frequency,
      category:    input.category,
      color:       input.color,
      created_at:  now,
      updated_at:  now,
    };

    let id_str      = encode_uuid(habit.id);
    let owner_str   = encode_uuid(habit.owner_id);
    let title       = habit.title.clone();
    let description = habit.description.clone();
    let frequency   = habit.frequency.as_str().to_owned();
    let category    = habit.category.clone();
    let color       = habit.color.as_str().to_owned();
    let at_str      = encode_dt(now);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO habits (
             habit_id, owner_id, title, description, frequency, category,
             color, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          rusqlite::params![
            id_str,
            owner_str,
            title,
            description,
            frequency,
            category,
            color,
            at_str,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(habit)
  }

  async fn list_habits(&self, owner: Uuid) -> Result<Vec<Habit>> {
    let owner_str = encode_uuid(owner);

    let raws: Vec<RawHabit> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {HABIT_COLUMNS} FROM habits
           WHERE owner_id = ?1
           ORDER BY created_at DESC"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![owner_str], RawHabit::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawHabit::into_habit).collect()
  }

  async fn get_habit(&self, owner: Uuid, id: Uuid) -> Result<Option<Habit>> {
    let id_str    = encode_uuid(id);
    let owner_str = encode_uuid(owner);

    let raw: Option<RawHabit> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {HABIT_COLUMNS} FROM habits
           WHERE habit_id = ?1 AND owner_id = ?2"
        );
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str, owner_str], RawHabit::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawHabit::into_habit).transpose()
  }

  async fn update_habit(
    &self,
    owner: Uuid,
    id: Uuid,
    input: HabitInput,
  ) -> Result<Option<Habit>> {
    let id_str      = encode_uuid(id);
    let owner_str   = encode_uuid(owner);
    let title       = input.title;
    let description = input.description;
    let frequency   = input.frequency.as_str().to_owned();
    let category    = input.category;
    let color       = input.color.as_str().to_owned();
    let at_str      = encode_dt(Utc::now());

    let raw: Option<RawHabit> = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE habits
           SET title = ?3, description = ?4, frequency = ?5, category = ?6,
               color = ?7, updated_at = ?8
           WHERE habit_id = ?1 AND owner_id = ?2",
          rusqlite::params![
            id_str,
            owner_str,
            title,
            description,
            frequency,
            category,
            color,
            at_str,
          ],
        )?;
        if changed == 0 {
          return Ok(None);
        }

        let sql = format!("SELECT {HABIT_COLUMNS} FROM habits WHERE habit_id = ?1");
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str], RawHabit::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawHabit::into_habit).transpose()
  }

  async fn delete_habit(&self, owner: Uuid, id: Uuid) -> Result<bool> {
    let id_str    = encode_uuid(id);
    let owner_str = encode_uuid(owner);

    let deleted = self
      .conn
      .call(move |conn| {
        // ON DELETE CASCADE clears the habit's completions.
        let n = conn.execute(
          "DELETE FROM habits WHERE habit_id = ?1 AND owner_id = ?2",
          rusqlite::params![id_str, owner_str],
        )?;
        Ok(n > 0)
      })
      .await?;

    Ok(deleted)
  }

  async fn get_completions(
    &self,
    owner: Uuid,
    id: Uuid,
  ) -> Result<Option<DateSet>> {
    let id_str    = encode_uuid(id);
    let owner_str = encode_uuid(owner);

    let days: Option<Vec<String>> = self
      .conn
      .call(move |conn| {
        if !habit_owned(conn, &id_str, &owner_str)? {
          return Ok(None);
        }
        Ok(Some(read_days(conn, &id_str)?))
      })
      .await?;

    days.map(decode_days).transpose()
  }

  async fn add_completion(
    &self,
    owner: Uuid,
    id: Uuid,
    day: NaiveDate,
  ) -> Result<Option<DateSet>> {
    let id_str    = encode_uuid(id);
    let owner_str = encode_uuid(owner);
    let day_str   = encode_day(day);
    let at_str    = encode_dt(Utc::now());

    let days: Option<Vec<String>> = self
      .conn
      .call(move |conn| {
        if !habit_owned(conn, &id_str, &owner_str)? {
          return Ok(None);
        }

        // The composite primary key turns a repeat mark into a no-op.
        conn.execute(
          "INSERT OR IGNORE INTO completions (habit_id, day) VALUES (?1, ?2)",
          rusqlite::params![id_str, day_str],
        )?;
        conn.execute(
          "UPDATE habits SET updated_at = ?2 WHERE habit_id = ?1",
          rusqlite::params![id_str, at_str],
        )?;

        Ok(Some(read_days(conn, &id_str)?))
      })
      .await?;

    days.map(decode_days).transpose()
  }

  async fn remove_completion(
    &self,
    owner: Uuid,
    id: Uuid,
    day: NaiveDate,
  ) -> Result<Option<DateSet>> {
    let id_str    = encode_uuid(id);
    let owner_str = encode_uuid(owner);
    let day_str   = encode_day(day);
    let at_str    = encode_dt(Utc::now());

    let days: Option<Vec<String>> = self
      .conn
      .call(move |conn| {
        if !habit_owned(conn, &id_str, &owner_str)? {
          return Ok(None);
        }

        conn.execute(
          "DELETE FROM completions WHERE habit_id = ?1 AND day = ?2",
          rusqlite::params![id_str, day_str],
        )?;
        conn.execute(
          "UPDATE habits SET updated_at = ?2 WHERE habit_id = ?1",
          rusqlite::params![id_str, at_str],
        )?;

        Ok(Some(read_days(conn, &id_str)?))
      })
      .await?;

    days.map(decode_days).transpose()
  }
}

// ─── AuthStore impl ──────────────────────────────────────────────────────────

impl AuthStore for SqliteStore {
  type Error = Error;

  async fn create_user(
    &self,
    email: String,
    password_hash: String,
  ) -> Result<User> {
    let user = User {
      id: Uuid::new_v4(),
      email,
      password_hash,
      created_at: Utc::now(),
    };

    let id_str    = encode_uuid(user.id);
    let email_str = user.email.clone();
    let hash      = user.password_hash.clone();
    let at_str    = encode_dt(user.created_at);

    let taken = self
      .conn
      .call(move |conn| {
        let exists: bool = conn
          .query_row(
            "SELECT 1 FROM users WHERE email = ?1",
            rusqlite::params![email_str],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if exists {
          return Ok(true);
        }

        conn.execute(
          "INSERT INTO users (user_id, email, password_hash, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, email_str, hash, at_str],
        )?;
        Ok(false)
      })
      .await?;

    if taken {
      return Err(Error::EmailTaken(user.email));
    }
    Ok(user)
  }

  async fn find_user(&self, email: &str) -> Result<Option<User>> {
    let email = email.to_owned();

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id, email, password_hash, created_at
               FROM users WHERE email = ?1",
              rusqlite::params![email],
              |row| {
                Ok(RawUser {
                  user_id:       row.get(0)?,
                  email:         row.get(1)?,
                  password_hash: row.get(2)?,
                  created_at:    row.get(3)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id, email, password_hash, created_at
               FROM users WHERE user_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawUser {
                  user_id:       row.get(0)?,
                  email:         row.get(1)?,
                  password_hash: row.get(2)?,
                  created_at:    row.get(3)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn create_session(
    &self,
    user_id: Uuid,
    token_hash: String,
    ttl: Duration,
  ) -> Result<Session> {
    let now = Utc::now();
    let session = Session {
      token_hash,
      user_id,
      created_at: now,
      expires_at: now + ttl,
    };

    let hash        = session.token_hash.clone();
    let user_id_str = encode_uuid(user_id);
    let created_str = encode_dt(session.created_at);
    let expires_str = encode_dt(session.expires_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO sessions (token_hash, user_id, created_at, expires_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![hash, user_id_str, created_str, expires_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(session)
  }

  async fn resolve_session(&self, token_hash: &str) -> Result<Option<Uuid>> {
    let hash    = token_hash.to_owned();
    let now_str = encode_dt(Utc::now());

    // RFC 3339 strings with a fixed +00:00 offset compare chronologically,
    // so the expiry check can stay in SQL.
    let user_id: Option<String> = self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM sessions WHERE token_hash = ?1 AND expires_at <= ?2",
          rusqlite::params![hash, now_str],
        )?;
        Ok(
          conn
            .query_row(
              "SELECT user_id FROM sessions
               WHERE token_hash = ?1 AND expires_at > ?2",
              rusqlite::params![hash, now_str],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    user_id.as_deref().map(decode_uuid).transpose()
  }

  async fn delete_session(&self, token_hash: &str) -> Result<bool> {
    let hash = token_hash.to_owned();

    let deleted = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "DELETE FROM sessions WHERE token_hash = ?1",
          rusqlite::params![hash],
        )?;
        Ok(n > 0)
      })
      .await?;

    Ok(deleted)
  }
}
