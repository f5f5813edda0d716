//! SQLite-backed draft storage.

use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

use sessioncraft_domain::{DraftPayload, SessionId};

use crate::infrastructure::ports::{ClockPort, DraftRepo, RepoError};

/// One row per session id. Saves overwrite unconditionally (last write wins).
pub struct SqliteDraftRepo {
    pool: SqlitePool,
    clock: Arc<dyn ClockPort>,
}

impl SqliteDraftRepo {
    pub async fn new(db_path: &str, clock: Arc<dyn ClockPort>) -> Result<Self, RepoError> {
        let pool = SqlitePool::connect(&format!("sqlite:{}?mode=rwc", db_path))
            .await
            .map_err(|e| RepoError::database("drafts", e))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS session_drafts (
                session_id TEXT PRIMARY KEY,
                payload_json TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await
        .map_err(|e| RepoError::database("drafts", e))?;

        Ok(Self { pool, clock })
    }
}

#[async_trait]
impl DraftRepo for SqliteDraftRepo {
    async fn save(&self, session_id: SessionId, payload: &DraftPayload) -> Result<(), RepoError> {
        let json = serde_json::to_string(payload).map_err(RepoError::serialization)?;
        let now = self.clock.now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO session_drafts (session_id, payload_json, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(session_id) DO UPDATE SET
                payload_json = excluded.payload_json,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(session_id.to_string())
        .bind(json)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::database("drafts_save", e))?;

        Ok(())
    }

    async fn load(&self, session_id: SessionId) -> Result<Option<DraftPayload>, RepoError> {
        let row = sqlx::query("SELECT payload_json FROM session_drafts WHERE session_id = ?")
            .bind(session_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("drafts_load", e))?;

        match row {
            Some(row) => {
                let json: String = row.get("payload_json");
                let payload = serde_json::from_str(&json).map_err(RepoError::serialization)?;
                Ok(Some(payload))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::FixedClock;
    use chrono::Utc;
    use tempfile::TempDir;

    async fn repo() -> (TempDir, SqliteDraftRepo) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("drafts.db");
        let repo = SqliteDraftRepo::new(path.to_str().unwrap(), Arc::new(FixedClock(Utc::now())))
            .await
            .unwrap();
        (dir, repo)
    }

    #[tokio::test]
    async fn unknown_session_loads_none() {
        let (_dir, repo) = repo().await;
        assert!(repo.load(SessionId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn last_write_wins() {
        let (_dir, repo) = repo().await;
        let session_id = SessionId::new();

        let mut first = DraftPayload::default();
        first.metadata.title = "First".into();
        let mut second = DraftPayload::default();
        second.metadata.title = "Second".into();
        second.ai_prompt_text = "make it punchy".into();

        repo.save(session_id, &first).await.unwrap();
        repo.save(session_id, &second).await.unwrap();

        assert_eq!(repo.load(session_id).await.unwrap(), Some(second));
    }

    #[tokio::test]
    async fn sessions_are_isolated() {
        let (_dir, repo) = repo().await;
        let a = SessionId::new();
        let b = SessionId::new();
        let mut payload = DraftPayload::default();
        payload.metadata.title = "A".into();

        repo.save(a, &payload).await.unwrap();

        assert!(repo.load(b).await.unwrap().is_none());
    }
}
