//! `discussions` table

use super::error::StoreError;
use super::schema::{millis, opt_millis, parsed, to_millis};
use super::store::SqliteStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use debate_application::{DiscussionRepository, RepositoryError};
use debate_domain::{
    AnalysisOutcome, BookId, Discussion, DiscussionId, DiscussionStatus, MemberId, NewDiscussion,
};
use rusqlite::{Connection, OptionalExtension, Row, params};

const COLUMNS: &str = "id, owner_id, book_id, title, content, status, start_date, closed_at, \
     views, conclusion, result, agree_percent, disagree_percent, reasoning, version, deleted, \
     deleted_at, created_at";

fn map_discussion(row: &Row<'_>) -> rusqlite::Result<Discussion> {
    let analysis = match row.get::<_, Option<String>>(9)? {
        Some(conclusion) => Some(AnalysisOutcome {
            conclusion,
            result: parsed(row, 10)?,
            agree_percent: row.get(11)?,
            disagree_percent: row.get(12)?,
            reasoning: row.get::<_, Option<String>>(13)?.unwrap_or_default(),
        }),
        None => None,
    };

    Ok(Discussion {
        id: DiscussionId(row.get(0)?),
        owner: MemberId(row.get(1)?),
        book: BookId(row.get(2)?),
        title: row.get(3)?,
        content: row.get(4)?,
        status: parsed(row, 5)?,
        start_date: millis(row, 6)?,
        closed_at: millis(row, 7)?,
        views: u64::try_from(row.get::<_, i64>(8)?).unwrap_or_default(),
        analysis,
        version: row.get(14)?,
        deleted: row.get(15)?,
        deleted_at: opt_millis(row, 16)?,
        created_at: millis(row, 17)?,
    })
}

fn find_in(conn: &Connection, id: DiscussionId) -> Result<Option<Discussion>, StoreError> {
    let sql = format!("SELECT {COLUMNS} FROM discussions WHERE id = ?1");
    Ok(conn
        .query_row(&sql, params![id.get()], map_discussion)
        .optional()?)
}

fn require(conn: &Connection, id: DiscussionId) -> Result<Discussion, StoreError> {
    find_in(conn, id)?.ok_or_else(|| RepositoryError::discussion_not_found(id).into())
}

/// Turn a zero-row versioned update into the right error.
fn missed_update(conn: &Connection, id: DiscussionId, expected: i64) -> StoreError {
    match find_in(conn, id) {
        Ok(Some(_)) => RepositoryError::VersionConflict { id, expected }.into(),
        Ok(None) => RepositoryError::discussion_not_found(id).into(),
        Err(e) => e,
    }
}

#[async_trait]
impl DiscussionRepository for SqliteStore {
    async fn insert(
        &self,
        new: &NewDiscussion,
        now: DateTime<Utc>,
    ) -> Result<Discussion, RepositoryError> {
        Ok(self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO discussions (owner_id, book_id, title, content, status, start_date, \
                 closed_at, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    new.owner.get(),
                    new.book.get(),
                    new.title,
                    new.content,
                    DiscussionStatus::Proposed.as_str(),
                    to_millis(new.start_date),
                    to_millis(new.closed_at()),
                    to_millis(now),
                ],
            )?;
            require(conn, DiscussionId(conn.last_insert_rowid()))
        })?)
    }

    async fn find(&self, id: DiscussionId) -> Result<Option<Discussion>, RepositoryError> {
        Ok(self.with_conn(|conn| find_in(conn, id))?)
    }

    async fn list_live(&self) -> Result<Vec<Discussion>, RepositoryError> {
        Ok(self.with_conn(|conn| {
            let sql = format!(
                "SELECT {COLUMNS} FROM discussions \
                 WHERE deleted = 0 AND status NOT IN ('COMPLETED', 'BLOCKED') ORDER BY id"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map([], map_discussion)?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })?)
    }

    async fn update_status(
        &self,
        id: DiscussionId,
        status: DiscussionStatus,
        expected_version: i64,
    ) -> Result<Discussion, RepositoryError> {
        Ok(self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE discussions SET status = ?1, version = version + 1 \
                 WHERE id = ?2 AND version = ?3",
                params![status.as_str(), id.get(), expected_version],
            )?;
            if changed == 0 {
                return Err(missed_update(conn, id, expected_version));
            }
            require(conn, id)
        })?)
    }

    async fn update_details(
        &self,
        edited: &Discussion,
        expected_version: i64,
    ) -> Result<Discussion, RepositoryError> {
        Ok(self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE discussions SET title = ?1, content = ?2, start_date = ?3, closed_at = ?4, \
                 version = version + 1 WHERE id = ?5 AND version = ?6",
                params![
                    edited.title,
                    edited.content,
                    to_millis(edited.start_date),
                    to_millis(edited.closed_at),
                    edited.id.get(),
                    expected_version,
                ],
            )?;
            if changed == 0 {
                return Err(missed_update(conn, edited.id, expected_version));
            }
            require(conn, edited.id)
        })?)
    }

    async fn soft_delete(
        &self,
        id: DiscussionId,
        at: DateTime<Utc>,
        expected_version: i64,
    ) -> Result<Discussion, RepositoryError> {
        Ok(self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE discussions SET deleted = 1, deleted_at = ?1, version = version + 1 \
                 WHERE id = ?2 AND version = ?3",
                params![to_millis(at), id.get(), expected_version],
            )?;
            if changed == 0 {
                return Err(missed_update(conn, id, expected_version));
            }
            require(conn, id)
        })?)
    }

    async fn increment_views(&self, id: DiscussionId) -> Result<(), RepositoryError> {
        Ok(self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE discussions SET views = views + 1 WHERE id = ?1",
                params![id.get()],
            )?;
            if changed == 0 {
                return Err(RepositoryError::discussion_not_found(id).into());
            }
            Ok(())
        })?)
    }

    async fn record_analysis(
        &self,
        id: DiscussionId,
        outcome: &AnalysisOutcome,
    ) -> Result<bool, RepositoryError> {
        Ok(self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE discussions SET conclusion = ?1, result = ?2, agree_percent = ?3, \
                 disagree_percent = ?4, reasoning = ?5 WHERE id = ?6 AND conclusion IS NULL",
                params![
                    outcome.conclusion,
                    outcome.result.as_str(),
                    outcome.agree_percent,
                    outcome.disagree_percent,
                    outcome.reasoning,
                    id.get(),
                ],
            )?;
            if changed == 0 {
                require(conn, id)?;
            }
            Ok(changed == 1)
        })?)
    }
}
