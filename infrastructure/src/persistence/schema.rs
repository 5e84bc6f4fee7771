//! Schema and column codecs
//!
//! Timestamps are stored as UTC milliseconds, enums as their canonical
//! upper-case names.

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, Row};
use std::str::FromStr;

pub(super) const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS discussions (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  owner_id INTEGER NOT NULL,
  book_id INTEGER NOT NULL,
  title TEXT NOT NULL,
  content TEXT NOT NULL,
  status TEXT NOT NULL,
  start_date INTEGER NOT NULL,
  closed_at INTEGER NOT NULL,
  views INTEGER NOT NULL DEFAULT 0,
  conclusion TEXT,
  result TEXT,
  agree_percent INTEGER,
  disagree_percent INTEGER,
  reasoning TEXT,
  version INTEGER NOT NULL DEFAULT 1,
  deleted INTEGER NOT NULL DEFAULT 0,
  deleted_at INTEGER,
  created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_discussions_live ON discussions(deleted, status);

CREATE TABLE IF NOT EXISTS participants (
  discussion_id INTEGER NOT NULL,
  member_id INTEGER NOT NULL,
  is_agree INTEGER NOT NULL,
  PRIMARY KEY (discussion_id, member_id)
);

CREATE TABLE IF NOT EXISTS comments (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  discussion_id INTEGER NOT NULL,
  author_id INTEGER NOT NULL,
  parent_id INTEGER,
  group_id INTEGER NOT NULL,
  group_order INTEGER NOT NULL,
  total_order INTEGER NOT NULL,
  is_agree INTEGER NOT NULL,
  status TEXT NOT NULL DEFAULT 'ACTIVE',
  content TEXT NOT NULL,
  deleted INTEGER NOT NULL DEFAULT 0,
  created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_comments_order ON comments(discussion_id, total_order);
CREATE INDEX IF NOT EXISTS idx_comments_group ON comments(group_id);

CREATE TABLE IF NOT EXISTS reports (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  reporter_id INTEGER NOT NULL,
  target_kind TEXT NOT NULL,
  target_id INTEGER NOT NULL,
  reason TEXT NOT NULL,
  status TEXT NOT NULL DEFAULT 'PENDING',
  created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_reports_target ON reports(target_kind, target_id, status);
CREATE UNIQUE INDEX IF NOT EXISTS idx_reports_pending_once
  ON reports(reporter_id, target_kind, target_id) WHERE status = 'PENDING';

CREATE TABLE IF NOT EXISTS scheduled_jobs (
  discussion_id INTEGER NOT NULL,
  stage TEXT NOT NULL,
  job_name TEXT NOT NULL UNIQUE,
  job_group TEXT NOT NULL,
  target TEXT NOT NULL,
  trigger_name TEXT NOT NULL,
  trigger_group TEXT NOT NULL,
  fire_at INTEGER NOT NULL,
  PRIMARY KEY (discussion_id, stage)
);
"#;

pub(super) fn migrate(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA)
}

pub(super) fn to_millis(at: DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}

pub(super) fn millis(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: i64 = row.get(idx)?;
    DateTime::from_timestamp_millis(raw).ok_or(rusqlite::Error::IntegralValueOutOfRange(idx, raw))
}

pub(super) fn opt_millis(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    match row.get::<_, Option<i64>>(idx)? {
        Some(_) => millis(row, idx).map(Some),
        None => Ok(None),
    }
}

/// Parse a text column through the type's `FromStr`.
pub(super) fn parsed<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.get(idx)?;
    raw.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
