//! `reports` table

use super::schema::to_millis;
use super::store::SqliteStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use debate_application::{ReportRepository, RepositoryError};
use debate_domain::{NewReport, Report, ReportId, ReportStatus, ReportTarget};
use rusqlite::{ErrorCode, params};

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(err, rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation)
}

#[async_trait]
impl ReportRepository for SqliteStore {
    async fn insert(
        &self,
        report: &NewReport,
        now: DateTime<Utc>,
    ) -> Result<Report, RepositoryError> {
        Ok(self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT INTO reports (reporter_id, target_kind, target_id, reason, status, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    report.reporter.get(),
                    report.target.kind(),
                    report.target.raw_id(),
                    report.reason,
                    ReportStatus::Pending.as_str(),
                    to_millis(now),
                ],
            );
            match inserted {
                Ok(_) => {}
                Err(e) if is_unique_violation(&e) => {
                    return Err(RepositoryError::Duplicate(format!(
                        "report by member {} on {}",
                        report.reporter, report.target
                    ))
                    .into());
                }
                Err(e) => return Err(e.into()),
            }

            Ok(Report {
                id: ReportId(conn.last_insert_rowid()),
                reporter: report.reporter,
                target: report.target,
                reason: report.reason.clone(),
                status: ReportStatus::Pending,
                created_at: now,
            })
        })?)
    }

    async fn count_pending(&self, target: ReportTarget) -> Result<usize, RepositoryError> {
        Ok(self.with_conn(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM reports \
                 WHERE target_kind = ?1 AND target_id = ?2 AND status = ?3",
                params![target.kind(), target.raw_id(), ReportStatus::Pending.as_str()],
                |row| row.get(0),
            )?;
            Ok(usize::try_from(count).unwrap_or_default())
        })?)
    }

    async fn accept_pending(&self, target: ReportTarget) -> Result<usize, RepositoryError> {
        Ok(self.with_tx(|tx| {
            let accepted = tx.execute(
                "UPDATE reports SET status = ?1 \
                 WHERE target_kind = ?2 AND target_id = ?3 AND status = ?4",
                params![
                    ReportStatus::AcceptedPendingReview.as_str(),
                    target.kind(),
                    target.raw_id(),
                    ReportStatus::Pending.as_str()
                ],
            )?;
            Ok(accepted)
        })?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use debate_domain::{CommentId, DiscussionId, MemberId};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 18, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_duplicate_report_rejected() {
        let store = SqliteStore::open_in_memory().unwrap();
        let report = NewReport::new(MemberId(1), ReportTarget::Discussion(DiscussionId(5)), "spam");

        store.insert(&report, now()).await.unwrap();
        let err = store.insert(&report, now()).await.unwrap_err();

        assert!(matches!(err, RepositoryError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_reporter_may_report_again_after_review() {
        let store = SqliteStore::open_in_memory().unwrap();
        let report = NewReport::new(MemberId(1), ReportTarget::Comment(CommentId(3)), "rude");
        store.insert(&report, now()).await.unwrap();
        store.accept_pending(report.target).await.unwrap();

        store.insert(&report, now()).await.unwrap();

        assert_eq!(store.count_pending(report.target).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_targets_are_counted_separately() {
        let store = SqliteStore::open_in_memory().unwrap();
        let discussion = ReportTarget::Discussion(DiscussionId(5));
        let comment = ReportTarget::Comment(CommentId(5));
        for member in 1..=2 {
            store
                .insert(&NewReport::new(MemberId(member), discussion, "spam"), now())
                .await
                .unwrap();
        }
        store
            .insert(&NewReport::new(MemberId(1), comment, "rude"), now())
            .await
            .unwrap();

        assert_eq!(store.count_pending(discussion).await.unwrap(), 2);
        assert_eq!(store.count_pending(comment).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_accept_moves_pending_reports() {
        let store = SqliteStore::open_in_memory().unwrap();
        let target = ReportTarget::Comment(CommentId(9));
        for member in 1..=3 {
            store
                .insert(&NewReport::new(MemberId(member), target, "rude"), now())
                .await
                .unwrap();
        }

        assert_eq!(store.accept_pending(target).await.unwrap(), 3);
        assert_eq!(store.count_pending(target).await.unwrap(), 0);
        assert_eq!(store.accept_pending(target).await.unwrap(), 0);
    }
}
