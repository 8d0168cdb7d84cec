use uuid::Uuid;

use crate::{
    api::error,
    modules::activity::{repository::ActivityRepository, schema::ActivityCursorEntity},
};

#[derive(Clone)]
pub struct ActivityRepositoryPg {
    pool: sqlx::PgPool,
}

impl ActivityRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ActivityRepository for ActivityRepositoryPg {
    async fn find_cursor(
        &self,
        user_id: &Uuid,
    ) -> Result<Option<ActivityCursorEntity>, error::SystemError> {
        let cursor = sqlx::query_as::<_, ActivityCursorEntity>(
            "SELECT * FROM activity_cursors WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(cursor)
    }

    async fn save_cursor(&self, cursor: &ActivityCursorEntity) -> Result<bool, error::SystemError> {
        let result = sqlx::query(
            r#"
            INSERT INTO activity_cursors
                (user_id, last_checked_at, last_likes_count, has_unseen, updated_at, version)
            VALUES ($1, $2, $3, $4, $5, $6 + 1)
            ON CONFLICT (user_id) DO UPDATE
            SET last_checked_at  = EXCLUDED.last_checked_at,
                last_likes_count = EXCLUDED.last_likes_count,
                has_unseen       = EXCLUDED.has_unseen,
                updated_at       = EXCLUDED.updated_at,
                version          = activity_cursors.version + 1
            WHERE activity_cursors.version = $6
            "#,
        )
        .bind(cursor.user_id)
        .bind(cursor.last_checked_at)
        .bind(cursor.last_likes_count)
        .bind(cursor.has_unseen)
        .bind(cursor.updated_at)
        .bind(cursor.version)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}
