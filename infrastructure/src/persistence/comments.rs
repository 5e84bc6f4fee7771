//! `comments` table
//!
//! Placement is planned by the domain and applied here inside one
//! transaction: read the cursor, shift if asked to, insert.

use super::error::StoreError;
use super::schema::{millis, parsed, to_millis};
use super::store::SqliteStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use debate_application::{CommentRepository, RepositoryError};
use debate_domain::{
    Comment, CommentDraft, CommentId, CommentStatus, DiscussionId, MemberId, ThreadCursor,
    VoteType, plan_placement,
};
use rusqlite::{Connection, OptionalExtension, Row, params};

const COLUMNS: &str = "id, discussion_id, author_id, parent_id, group_id, group_order, \
     total_order, is_agree, status, content, deleted, created_at";

fn map_comment(row: &Row<'_>) -> rusqlite::Result<Comment> {
    Ok(Comment {
        id: CommentId(row.get(0)?),
        discussion_id: DiscussionId(row.get(1)?),
        author: MemberId(row.get(2)?),
        parent_id: row.get::<_, Option<i64>>(3)?.map(CommentId),
        group_id: row.get(4)?,
        group_order: row.get(5)?,
        total_order: row.get(6)?,
        vote: VoteType::from_is_agree(row.get(7)?),
        status: parsed(row, 8)?,
        content: row.get(9)?,
        deleted: row.get(10)?,
        created_at: millis(row, 11)?,
    })
}

fn find_in(conn: &Connection, id: CommentId) -> Result<Option<Comment>, StoreError> {
    let sql = format!("SELECT {COLUMNS} FROM comments WHERE id = ?1");
    Ok(conn.query_row(&sql, params![id.get()], map_comment).optional()?)
}

fn cursor_for(conn: &Connection, draft: &CommentDraft) -> Result<ThreadCursor, StoreError> {
    let Some(parent_id) = draft.parent_id else {
        let max_group_id: i64 =
            conn.query_row("SELECT COALESCE(MAX(group_id), 0) FROM comments", [], |row| {
                row.get(0)
            })?;
        let max_total_order: i64 = conn.query_row(
            "SELECT COALESCE(MAX(total_order), 0) FROM comments WHERE discussion_id = ?1",
            params![draft.discussion_id.get()],
            |row| row.get(0),
        )?;
        return Ok(ThreadCursor::Root {
            max_group_id,
            max_total_order,
        });
    };

    let group_id: i64 = conn
        .query_row(
            "SELECT group_id FROM comments WHERE id = ?1 AND discussion_id = ?2",
            params![parent_id.get(), draft.discussion_id.get()],
            |row| row.get(0),
        )
        .optional()?
        .ok_or_else(|| StoreError::from(RepositoryError::comment_not_found(parent_id)))?;

    let (max_group_order, max_total_order_in_group): (i64, i64) = conn.query_row(
        "SELECT COALESCE(MAX(group_order), 0), COALESCE(MAX(total_order), 0) \
         FROM comments WHERE group_id = ?1",
        params![group_id],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;

    Ok(ThreadCursor::Reply {
        group_id,
        max_group_order,
        max_total_order_in_group,
    })
}

#[async_trait]
impl CommentRepository for SqliteStore {
    async fn insert(
        &self,
        draft: &CommentDraft,
        now: DateTime<Utc>,
    ) -> Result<Comment, RepositoryError> {
        Ok(self.with_tx(|tx| {
            let placement = plan_placement(cursor_for(tx, draft)?);

            if let Some(from) = placement.shift_from {
                tx.execute(
                    "UPDATE comments SET total_order = total_order + 1 \
                     WHERE discussion_id = ?1 AND total_order >= ?2",
                    params![draft.discussion_id.get(), from],
                )?;
            }

            tx.execute(
                "INSERT INTO comments (discussion_id, author_id, parent_id, group_id, group_order, \
                 total_order, is_agree, status, content, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    draft.discussion_id.get(),
                    draft.author.get(),
                    draft.parent_id.map(CommentId::get),
                    placement.group_id,
                    placement.group_order,
                    placement.total_order,
                    draft.vote.is_agree(),
                    CommentStatus::Active.as_str(),
                    draft.content,
                    to_millis(now),
                ],
            )?;

            find_in(tx, CommentId(tx.last_insert_rowid()))?.ok_or_else(|| {
                RepositoryError::Storage("inserted comment vanished".to_string()).into()
            })
        })?)
    }

    async fn find(&self, id: CommentId) -> Result<Option<Comment>, RepositoryError> {
        Ok(self.with_conn(|conn| find_in(conn, id))?)
    }

    async fn list_thread(
        &self,
        discussion_id: DiscussionId,
    ) -> Result<Vec<Comment>, RepositoryError> {
        Ok(self.with_conn(|conn| {
            let sql = format!(
                "SELECT {COLUMNS} FROM comments WHERE discussion_id = ?1 ORDER BY total_order"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params![discussion_id.get()], map_comment)?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })?)
    }

    async fn soft_delete(&self, id: CommentId) -> Result<(), RepositoryError> {
        Ok(self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE comments SET deleted = 1 WHERE id = ?1",
                params![id.get()],
            )?;
            if changed == 0 {
                return Err(RepositoryError::comment_not_found(id).into());
            }
            Ok(())
        })?)
    }

    async fn set_status(
        &self,
        id: CommentId,
        status: CommentStatus,
    ) -> Result<(), RepositoryError> {
        Ok(self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE comments SET status = ?1 WHERE id = ?2",
                params![status.as_str(), id.get()],
            )?;
            if changed == 0 {
                return Err(RepositoryError::comment_not_found(id).into());
            }
            Ok(())
        })?)
    }

    async fn count_by_author_vote(
        &self,
        discussion_id: DiscussionId,
        author: MemberId,
        vote: VoteType,
    ) -> Result<usize, RepositoryError> {
        Ok(self.with_conn(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM comments \
                 WHERE discussion_id = ?1 AND author_id = ?2 AND is_agree = ?3 AND deleted = 0",
                params![discussion_id.get(), author.get(), vote.is_agree()],
                |row| row.get(0),
            )?;
            Ok(usize::try_from(count).unwrap_or_default())
        })?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 18, 0, 0).unwrap()
    }

    async fn root(store: &SqliteStore, discussion: i64, content: &str) -> Comment {
        store
            .insert(
                &CommentDraft::root(DiscussionId(discussion), MemberId(1), VoteType::Agree, content),
                now(),
            )
            .await
            .unwrap()
    }

    async fn reply(store: &SqliteStore, parent: &Comment, content: &str) -> Comment {
        store
            .insert(
                &CommentDraft::reply(
                    parent.discussion_id,
                    MemberId(2),
                    parent.id,
                    VoteType::Disagree,
                    content,
                ),
                now(),
            )
            .await
            .unwrap()
    }

    async fn order(store: &SqliteStore, discussion: i64) -> Vec<(String, i64)> {
        store
            .list_thread(DiscussionId(discussion))
            .await
            .unwrap()
            .into_iter()
            .map(|c| (c.content, c.total_order))
            .collect()
    }

    #[tokio::test]
    async fn test_reply_shifts_later_groups() {
        let store = SqliteStore::open_in_memory().unwrap();
        let a = root(&store, 1, "A").await;
        let b = root(&store, 1, "B").await;
        reply(&store, &a, "A1").await;
        reply(&store, &a, "A2").await;
        reply(&store, &b, "B1").await;

        assert_eq!(
            order(&store, 1).await,
            vec![
                ("A".to_string(), 1),
                ("A1".to_string(), 2),
                ("A2".to_string(), 3),
                ("B".to_string(), 4),
                ("B1".to_string(), 5),
            ]
        );
    }

    #[tokio::test]
    async fn test_groups_are_global_orders_are_not() {
        let store = SqliteStore::open_in_memory().unwrap();
        let first = root(&store, 1, "one").await;
        let second = root(&store, 2, "two").await;

        assert_eq!(first.group_id, 1);
        assert_eq!(second.group_id, 2);
        assert_eq!(first.total_order, 1);
        assert_eq!(second.total_order, 1);
    }

    #[tokio::test]
    async fn test_reply_to_other_discussion_rejected() {
        let store = SqliteStore::open_in_memory().unwrap();
        let a = root(&store, 1, "A").await;

        let err = store
            .insert(
                &CommentDraft::reply(DiscussionId(2), MemberId(2), a.id, VoteType::Agree, "x"),
                now(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, RepositoryError::NotFound { entity: "comment", .. }));
        assert!(order(&store, 2).await.is_empty());
    }

    #[tokio::test]
    async fn test_soft_delete_keeps_order_and_counts() {
        let store = SqliteStore::open_in_memory().unwrap();
        let a = root(&store, 1, "A").await;
        root(&store, 1, "B").await;

        store.soft_delete(a.id).await.unwrap();

        let thread = store.list_thread(DiscussionId(1)).await.unwrap();
        assert_eq!(thread.len(), 2);
        assert!(thread[0].deleted);
        let remaining = store
            .count_by_author_vote(DiscussionId(1), MemberId(1), VoteType::Agree)
            .await
            .unwrap();
        assert_eq!(remaining, 1);
    }

    #[tokio::test]
    async fn test_block_comment() {
        let store = SqliteStore::open_in_memory().unwrap();
        let a = root(&store, 1, "A").await;

        store.set_status(a.id, CommentStatus::Blocked).await.unwrap();

        let stored = store.find(a.id).await.unwrap().unwrap();
        assert_eq!(stored.status, CommentStatus::Blocked);
        assert!(!stored.is_visible());
    }
}
