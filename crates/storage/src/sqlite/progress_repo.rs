use chrono::{DateTime, NaiveDate, Utc};
use quiz_core::model::{ProgressEntry, ProgressLedger};
use sqlx::Row;

use super::{SqliteRepository, SyncMark};
use crate::repository::{ProgressRepository, StorageError};

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn conn(e: sqlx::Error) -> StorageError {
    StorageError::Connection(e.to_string())
}

fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

fn u64_from_i64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

fn map_entry_row(row: &sqlx::sqlite::SqliteRow) -> Result<ProgressEntry, StorageError> {
    let attempt = u32_from_i64("attempt", row.try_get::<i64, _>("attempt").map_err(ser)?)?;
    let score: f64 = row.try_get("score").map_err(ser)?;
    let time_spent: f64 = row.try_get("time_spent").map_err(ser)?;
    let average: Option<f64> = row.try_get("average_time").map_err(ser)?;
    let completed_on: NaiveDate = row.try_get("completed_on").map_err(ser)?;

    ProgressEntry::from_persisted(attempt, score, time_spent, average, completed_on).map_err(ser)
}

#[async_trait::async_trait]
impl ProgressRepository for SqliteRepository {
    async fn load_ledger(&self) -> Result<ProgressLedger, StorageError> {
        let mut mark = self.mark.lock().await;

        let rows = sqlx::query(
            r"
                SELECT attempt, score, time_spent, average_time, completed_on
                FROM progress_entries
                ORDER BY attempt ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let registration = sqlx::query(
            r"
                SELECT clicks, last_click_at
                FROM registration_interest
                WHERE id = 1
            ",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        if rows.is_empty() && registration.is_none() {
            *mark = SyncMark::default();
            return Err(StorageError::NotFound);
        }

        let mut entries = Vec::with_capacity(rows.len());
        for row in &rows {
            entries.push(map_entry_row(row)?);
        }

        let (clicks, last_click) = match registration {
            Some(row) => (
                u64_from_i64("clicks", row.try_get::<i64, _>("clicks").map_err(ser)?)?,
                row.try_get::<Option<DateTime<Utc>>, _>("last_click_at")
                    .map_err(ser)?,
            ),
            None => (0, None),
        };

        let ledger = ProgressLedger::from_persisted(entries, clicks, last_click).map_err(ser)?;
        *mark = SyncMark {
            attempts: u64::try_from(ledger.len()).unwrap_or(u64::MAX),
            clicks,
        };
        Ok(ledger)
    }

    async fn save_ledger(&self, ledger: &ProgressLedger) -> Result<(), StorageError> {
        let mut mark = self.mark.lock().await;
        let mut tx = self.pool.begin().await.map_err(conn)?;

        let stored: i64 = sqlx::query("SELECT COALESCE(MAX(attempt), 0) AS n FROM progress_entries")
            .fetch_one(&mut *tx)
            .await
            .map_err(conn)?
            .try_get("n")
            .map_err(ser)?;
        let stored = u64_from_i64("attempt", stored)?;
        let held = u64::try_from(ledger.len()).unwrap_or(u64::MAX);
        if stored != mark.attempts || held < stored {
            tx.rollback().await.map_err(conn)?;
            return Err(StorageError::Conflict(format!(
                "store holds {stored} attempts, this handle last saw {} and the ledger has {held}",
                mark.attempts
            )));
        }

        for entry in ledger
            .entries()
            .iter()
            .filter(|e| u64::from(e.attempt()) > stored)
        {
            sqlx::query(
                r"
                    INSERT INTO progress_entries (
                        attempt, score, time_spent, average_time, completed_on
                    )
                    VALUES (?1, ?2, ?3, ?4, ?5)
                ",
            )
            .bind(i64::from(entry.attempt()))
            .bind(entry.score())
            .bind(entry.time_spent_secs())
            .bind(entry.average_secs())
            .bind(entry.date())
            .execute(&mut *tx)
            .await
            .map_err(conn)?;
        }

        // Clicks are merged as an increment so concurrent writers add up.
        let new_clicks = ledger.registration_clicks().saturating_sub(mark.clicks);
        let delta = i64::try_from(new_clicks)
            .map_err(|_| StorageError::Serialization("clicks overflow".into()))?;
        let last_click = (new_clicks > 0)
            .then(|| ledger.last_registration_click())
            .flatten();
        sqlx::query(
            r"
                INSERT INTO registration_interest (id, clicks, last_click_at)
                VALUES (1, ?1, ?2)
                ON CONFLICT(id) DO UPDATE SET
                    clicks = registration_interest.clicks + excluded.clicks,
                    last_click_at = COALESCE(excluded.last_click_at, registration_interest.last_click_at)
            ",
        )
        .bind(delta)
        .bind(last_click)
        .execute(&mut *tx)
        .await
        .map_err(conn)?;

        tx.commit().await.map_err(conn)?;
        *mark = SyncMark {
            attempts: held,
            clicks: ledger.registration_clicks(),
        };
        Ok(())
    }
}
