use chrono::Utc;
use sqlx::SqlitePool;

use crate::database::models::{ActivityLog, CreateActivityInput};

#[derive(Clone)]
pub struct ActivityRepository {
    pool: SqlitePool,
}

impl ActivityRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Log a new activity
    pub async fn log_activity(
        &self,
        request: CreateActivityInput,
    ) -> Result<ActivityLog, sqlx::Error> {
        let metadata_json = request
            .metadata
            .map(|m| serde_json::to_string(&m).unwrap_or_default());

        sqlx::query_as::<_, ActivityLog>(
            r#"
            INSERT INTO activity_logs (
                actor_id, entity_type, entity_id, action, description, metadata, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING
                id, actor_id, entity_type, entity_id, action, description, metadata, created_at
            "#,
        )
        .bind(request.actor_id)
        .bind(request.entity_type)
        .bind(request.entity_id)
        .bind(request.action)
        .bind(request.description)
        .bind(metadata_json)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
    }

    /// Activity for one entity, oldest first
    pub async fn for_entity(
        &self,
        entity_type: &str,
        entity_id: &str,
    ) -> Result<Vec<ActivityLog>, sqlx::Error> {
        sqlx::query_as::<_, ActivityLog>(
            r#"
            SELECT
                id, actor_id, entity_type, entity_id, action, description, metadata, created_at
            FROM activity_logs
            WHERE entity_type = ? AND entity_id = ?
            ORDER BY id ASC
            "#,
        )
        .bind(entity_type)
        .bind(entity_id)
        .fetch_all(&self.pool)
        .await
    }
}
