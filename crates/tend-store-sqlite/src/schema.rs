//! SQL schema for the Tend SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id       TEXT PRIMARY KEY,
    email         TEXT NOT NULL UNIQUE,  -- normalised to lowercase
    password_hash TEXT NOT NULL,         -- argon2 PHC string
    created_at    TEXT NOT NULL          -- ISO 8601 UTC
);

-- Sessions are keyed by the SHA-256 hex digest of the client token.
-- The raw token exists only in the client's cookie or config.
CREATE TABLE IF NOT EXISTS sessions (
    token_hash TEXT PRIMARY KEY,
    user_id    TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    created_at TEXT NOT NULL,
    expires_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS habits (
    habit_id    TEXT PRIMARY KEY,
    owner_id    TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    title       TEXT NOT NULL,
    description TEXT NOT NULL,
    frequency   TEXT NOT NULL,   -- 'daily' | 'weekly' | 'weekdays' | 'weekends'
    category    TEXT NOT NULL,
    color       TEXT NOT NULL,   -- '#RGB' or '#RRGGBB'
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

-- Completion days are a set: the composite key makes re-marking a day a
-- no-op, and the cascade removes a habit's history with the habit.
CREATE TABLE IF NOT EXISTS completions (
    habit_id TEXT NOT NULL REFERENCES habits(habit_id) ON DELETE CASCADE,
    day      TEXT NOT NULL,      -- bare ISO date, e.g. '2024-01-03'
    PRIMARY KEY (habit_id, day)
);

CREATE INDEX IF NOT EXISTS habits_owner_idx    ON habits(owner_id);
CREATE INDEX IF NOT EXISTS sessions_user_idx   ON sessions(user_id);
CREATE INDEX IF NOT EXISTS sessions_expiry_idx ON sessions(expires_at);

PRAGMA user_version = 1;
";
