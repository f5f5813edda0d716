//! SQLite-backed topic store.

use std::path::Path;

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use sessioncraft_domain::{Topic, TopicId};

use crate::infrastructure::ports::{RepoError, TopicRepo};

/// Name hits weigh more than description hits when ranking.
const NAME_MATCH_WEIGHT: i64 = 2;
const TEXT_MATCH_WEIGHT: i64 = 1;

/// SQLite implementation of the topic store.
pub struct SqliteTopicRepo {
    pool: SqlitePool,
}

impl SqliteTopicRepo {
    pub async fn new(db_path: &str) -> Result<Self, RepoError> {
        let pool = SqlitePool::connect(&format!("sqlite:{}?mode=rwc", db_path))
            .await
            .map_err(|e| RepoError::database("topics", e))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS topics (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                category TEXT NOT NULL,
                ai_enhanced_content TEXT
            )
            "#,
        )
        .execute(&pool)
        .await
        .map_err(|e| RepoError::database("topics", e))?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_topics_category ON topics (category COLLATE NOCASE)")
            .execute(&pool)
            .await
            .map_err(|e| RepoError::database("topics", e))?;

        Ok(Self { pool })
    }

    /// Import topics from a JSON array file, replacing rows with the same id.
    /// Returns how many topics were imported.
    pub async fn seed_from_file(&self, path: &Path) -> Result<usize, RepoError> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| RepoError::database("topics_seed", e))?;
        let topics: Vec<Topic> = serde_json::from_str(&raw).map_err(RepoError::serialization)?;

        for topic in &topics {
            self.upsert(topic).await?;
        }
        Ok(topics.len())
    }

    /// Insert or replace a topic.
    pub async fn upsert(&self, topic: &Topic) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO topics (id, name, description, category, ai_enhanced_content)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                description = excluded.description,
                category = excluded.category,
                ai_enhanced_content = excluded.ai_enhanced_content
            "#,
        )
        .bind(topic.id.to_string())
        .bind(&topic.name)
        .bind(&topic.description)
        .bind(&topic.category)
        .bind(topic.ai_enhanced_content.as_deref())
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::database("topics_upsert", e))?;

        Ok(())
    }
}

#[async_trait]
impl TopicRepo for SqliteTopicRepo {
    async fn find_by_category_and_keywords(
        &self,
        category: &str,
        keywords: &[String],
        limit: usize,
    ) -> Result<Vec<Topic>, RepoError> {
        if keywords.is_empty() {
            return Ok(Vec::new());
        }

        let score = keywords
            .iter()
            .map(|_| {
                format!(
                    "(CASE WHEN lower(name) LIKE ? ESCAPE '\\' THEN {NAME_MATCH_WEIGHT} ELSE 0 END) + \
                     (CASE WHEN lower(description) LIKE ? ESCAPE '\\' \
                        OR lower(COALESCE(ai_enhanced_content, '')) LIKE ? ESCAPE '\\' \
                      THEN {TEXT_MATCH_WEIGHT} ELSE 0 END)"
                )
            })
            .collect::<Vec<_>>()
            .join(" + ");

        let query = format!(
            "SELECT id, name, description, category, ai_enhanced_content FROM (\
                SELECT *, ({score}) AS score FROM topics WHERE category = ? COLLATE NOCASE\
             ) WHERE score > 0 ORDER BY score DESC, name ASC LIMIT ?"
        );

        let mut q = sqlx::query(&query);
        for keyword in keywords {
            let pattern = like_pattern(keyword);
            q = q.bind(pattern.clone()).bind(pattern.clone()).bind(pattern);
        }

        let rows = q
            .bind(category)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepoError::database("topics_by_keywords", e))?;

        rows.iter().map(row_to_topic).collect()
    }

    async fn find_by_category(&self, category: &str, limit: usize) -> Result<Vec<Topic>, RepoError> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, description, category, ai_enhanced_content
            FROM topics
            WHERE category = ? COLLATE NOCASE
            ORDER BY name ASC
            LIMIT ?
            "#,
        )
        .bind(category)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::database("topics_by_category", e))?;

        rows.iter().map(row_to_topic).collect()
    }
}

fn like_pattern(keyword: &str) -> String {
    let escaped = keyword
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

fn row_to_topic(row: &SqliteRow) -> Result<Topic, RepoError> {
    let id: String = row.get("id");
    let id = Uuid::parse_str(&id).map_err(RepoError::serialization)?;

    Ok(Topic {
        id: TopicId::from_uuid(id),
        name: row.get("name"),
        description: row.get("description"),
        category: row.get("category"),
        ai_enhanced_content: row.get("ai_enhanced_content"),
    })
}
