//! `scheduled_jobs` table

use super::schema::{millis, parsed, to_millis};
use super::store::SqliteStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use debate_application::{RepositoryError, ScheduledJobStore};
use debate_domain::{DiscussionId, ScheduledJob, Stage};
use rusqlite::{OptionalExtension, Row, params};

const COLUMNS: &str =
    "discussion_id, stage, job_name, job_group, target, trigger_name, trigger_group, fire_at";

fn map_job(row: &Row<'_>) -> rusqlite::Result<ScheduledJob> {
    Ok(ScheduledJob {
        discussion_id: DiscussionId(row.get(0)?),
        stage: parsed(row, 1)?,
        job_name: row.get(2)?,
        job_group: row.get(3)?,
        target: row.get(4)?,
        trigger_name: row.get(5)?,
        trigger_group: row.get(6)?,
        fire_at: millis(row, 7)?,
    })
}

#[async_trait]
impl ScheduledJobStore for SqliteStore {
    async fn upsert_all(&self, jobs: &[ScheduledJob]) -> Result<(), RepositoryError> {
        Ok(self.with_tx(|tx| {
            let mut stmt = tx.prepare(
                "INSERT INTO scheduled_jobs (discussion_id, stage, job_name, job_group, target, \
                 trigger_name, trigger_group, fire_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8) \
                 ON CONFLICT(discussion_id, stage) DO UPDATE SET \
                   job_name = excluded.job_name, \
                   job_group = excluded.job_group, \
                   target = excluded.target, \
                   trigger_name = excluded.trigger_name, \
                   trigger_group = excluded.trigger_group, \
                   fire_at = excluded.fire_at",
            )?;
            for job in jobs {
                stmt.execute(params![
                    job.discussion_id.get(),
                    job.stage.as_str(),
                    job.job_name,
                    job.job_group,
                    job.target,
                    job.trigger_name,
                    job.trigger_group,
                    to_millis(job.fire_at),
                ])?;
            }
            Ok(())
        })?)
    }

    async fn find(
        &self,
        discussion_id: DiscussionId,
        stage: Stage,
    ) -> Result<Option<ScheduledJob>, RepositoryError> {
        Ok(self.with_conn(|conn| {
            let sql =
                format!("SELECT {COLUMNS} FROM scheduled_jobs WHERE discussion_id = ?1 AND stage = ?2");
            Ok(conn
                .query_row(&sql, params![discussion_id.get(), stage.as_str()], map_job)
                .optional()?)
        })?)
    }

    async fn list_for(
        &self,
        discussion_id: DiscussionId,
    ) -> Result<Vec<ScheduledJob>, RepositoryError> {
        Ok(self.with_conn(|conn| {
            let sql = format!(
                "SELECT {COLUMNS} FROM scheduled_jobs WHERE discussion_id = ?1 ORDER BY fire_at"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params![discussion_id.get()], map_job)?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })?)
    }

    async fn list_all(&self) -> Result<Vec<ScheduledJob>, RepositoryError> {
        Ok(self.with_conn(|conn| {
            let sql = format!("SELECT {COLUMNS} FROM scheduled_jobs ORDER BY fire_at, discussion_id");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map([], map_job)?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })?)
    }

    async fn update_fire_times(
        &self,
        discussion_id: DiscussionId,
        fire_times: &[(Stage, DateTime<Utc>)],
    ) -> Result<Vec<ScheduledJob>, RepositoryError> {
        Ok(self.with_tx(|tx| {
            let select = format!(
                "SELECT {COLUMNS} FROM scheduled_jobs WHERE discussion_id = ?1 AND stage = ?2"
            );
            let mut updated = Vec::new();
            for (stage, fire_at) in fire_times {
                let changed = tx.execute(
                    "UPDATE scheduled_jobs SET fire_at = ?1 WHERE discussion_id = ?2 AND stage = ?3",
                    params![to_millis(*fire_at), discussion_id.get(), stage.as_str()],
                )?;
                if changed == 0 {
                    continue;
                }
                updated.push(tx.query_row(
                    &select,
                    params![discussion_id.get(), stage.as_str()],
                    map_job,
                )?);
            }
            Ok(updated)
        })?)
    }

    async fn delete(
        &self,
        discussion_id: DiscussionId,
        stage: Stage,
    ) -> Result<bool, RepositoryError> {
        Ok(self.with_conn(|conn| {
            let removed = conn.execute(
                "DELETE FROM scheduled_jobs WHERE discussion_id = ?1 AND stage = ?2",
                params![discussion_id.get(), stage.as_str()],
            )?;
            Ok(removed > 0)
        })?)
    }

    async fn delete_all(&self, discussion_id: DiscussionId) -> Result<usize, RepositoryError> {
        Ok(self.with_conn(|conn| {
            Ok(conn.execute(
                "DELETE FROM scheduled_jobs WHERE discussion_id = ?1",
                params![discussion_id.get()],
            )?)
        })?)
    }
}
