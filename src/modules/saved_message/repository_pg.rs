use uuid::Uuid;

use crate::{
    api::error,
    modules::saved_message::{repository::SavedMessageRepository, schema::SavedMessageEntity},
};

#[derive(Clone)]
pub struct SavedMessageRepositoryPg {
    pool: sqlx::PgPool,
}

impl SavedMessageRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl SavedMessageRepository for SavedMessageRepositoryPg {
    async fn create(
        &self,
        message: &SavedMessageEntity,
    ) -> Result<SavedMessageEntity, error::SystemError> {
        let saved = sqlx::query_as::<_, SavedMessageEntity>(
            r#"
            INSERT INTO saved_messages (id, from_user_id, to_user_id, content, sent_at, saved_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(message.id)
        .bind(message.from_user_id)
        .bind(message.to_user_id)
        .bind(&message.content)
        .bind(message.sent_at)
        .bind(message.saved_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(saved)
    }

    async fn find_by_id(
        &self,
        id: &Uuid,
    ) -> Result<Option<SavedMessageEntity>, error::SystemError> {
        let message =
            sqlx::query_as::<_, SavedMessageEntity>("SELECT * FROM saved_messages WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(message)
    }

    async fn find_between(
        &self,
        user_a: &Uuid,
        user_b: &Uuid,
        from: &chrono::DateTime<chrono::Utc>,
        to: &chrono::DateTime<chrono::Utc>,
    ) -> Result<Vec<SavedMessageEntity>, error::SystemError> {
        let messages = sqlx::query_as::<_, SavedMessageEntity>(
            r#"
            SELECT * FROM saved_messages
            WHERE ((from_user_id = $1 AND to_user_id = $2)
                OR (from_user_id = $2 AND to_user_id = $1))
              AND sent_at >= $3 AND sent_at < $4
            ORDER BY sent_at ASC
            "#,
        )
        .bind(user_a)
        .bind(user_b)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;
        Ok(messages)
    }

    async fn delete(&self, id: &Uuid) -> Result<bool, error::SystemError> {
        let result = sqlx::query("DELETE FROM saved_messages WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
