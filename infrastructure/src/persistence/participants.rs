//! `participants` table

use super::store::SqliteStore;
use async_trait::async_trait;
use debate_application::{ParticipantRepository, RepositoryError};
use debate_domain::{DiscussionId, MemberId, Participant, Tally};
use rusqlite::{OptionalExtension, params};

#[async_trait]
impl ParticipantRepository for SqliteStore {
    async fn find(
        &self,
        discussion_id: DiscussionId,
        member_id: MemberId,
    ) -> Result<Option<Participant>, RepositoryError> {
        Ok(self.with_conn(|conn| {
            Ok(conn
                .query_row(
                    "SELECT is_agree FROM participants WHERE discussion_id = ?1 AND member_id = ?2",
                    params![discussion_id.get(), member_id.get()],
                    |row| {
                        Ok(Participant {
                            discussion_id,
                            member_id,
                            is_agree: row.get(0)?,
                        })
                    },
                )
                .optional()?)
        })?)
    }

    async fn insert(&self, participant: &Participant) -> Result<(), RepositoryError> {
        Ok(self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO participants (discussion_id, member_id, is_agree) \
                 VALUES (?1, ?2, ?3)",
                params![
                    participant.discussion_id.get(),
                    participant.member_id.get(),
                    participant.is_agree
                ],
            )?;
            if inserted == 0 {
                return Err(RepositoryError::Duplicate(format!(
                    "participant {} in discussion {}",
                    participant.member_id, participant.discussion_id
                ))
                .into());
            }
            Ok(())
        })?)
    }

    async fn replace(&self, participant: &Participant) -> Result<(), RepositoryError> {
        Ok(self.with_tx(|tx| {
            tx.execute(
                "DELETE FROM participants WHERE discussion_id = ?1 AND member_id = ?2",
                params![participant.discussion_id.get(), participant.member_id.get()],
            )?;
            tx.execute(
                "INSERT INTO participants (discussion_id, member_id, is_agree) VALUES (?1, ?2, ?3)",
                params![
                    participant.discussion_id.get(),
                    participant.member_id.get(),
                    participant.is_agree
                ],
            )?;
            Ok(())
        })?)
    }

    async fn delete(
        &self,
        discussion_id: DiscussionId,
        member_id: MemberId,
    ) -> Result<bool, RepositoryError> {
        Ok(self.with_conn(|conn| {
            let removed = conn.execute(
                "DELETE FROM participants WHERE discussion_id = ?1 AND member_id = ?2",
                params![discussion_id.get(), member_id.get()],
            )?;
            Ok(removed > 0)
        })?)
    }

    async fn tally(&self, discussion_id: DiscussionId) -> Result<Tally, RepositoryError> {
        Ok(self.with_conn(|conn| {
            let (agree, total): (i64, i64) = conn.query_row(
                "SELECT COALESCE(SUM(is_agree), 0), COUNT(*) FROM participants \
                 WHERE discussion_id = ?1",
                params![discussion_id.get()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )?;
            let agree = usize::try_from(agree).unwrap_or_default();
            let total = usize::try_from(total).unwrap_or_default();
            Ok(Tally::new(agree, total.saturating_sub(agree)))
        })?)
    }
}
