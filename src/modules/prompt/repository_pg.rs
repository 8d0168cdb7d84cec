use uuid::Uuid;

use crate::{
    api::error,
    modules::prompt::{
        repository::PromptRepository,
        schema::{PromptEntity, PromptResponseEntity},
    },
};

#[derive(Clone)]
pub struct PromptRepositoryPg {
    pool: sqlx::PgPool,
}

impl PromptRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl PromptRepository for PromptRepositoryPg {
    async fn find_current_prompt(&self) -> Result<Option<PromptEntity>, error::SystemError> {
        let prompt = sqlx::query_as::<_, PromptEntity>(
            "SELECT text, updated_at FROM current_prompt WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(prompt)
    }

    async fn set_current_prompt(&self, text: &str) -> Result<PromptEntity, error::SystemError> {
        let prompt = sqlx::query_as::<_, PromptEntity>(
            r#"
            INSERT INTO current_prompt (id, text, updated_at)
            VALUES (1, $1, NOW())
            ON CONFLICT (id) DO UPDATE
            SET text = EXCLUDED.text, updated_at = EXCLUDED.updated_at
            RETURNING text, updated_at
            "#,
        )
        .bind(text)
        .fetch_one(&self.pool)
        .await?;
        Ok(prompt)
    }

    async fn create_response(
        &self,
        user_id: &Uuid,
        text: &str,
    ) -> Result<PromptResponseEntity, error::SystemError> {
        let response = sqlx::query_as::<_, PromptResponseEntity>(
            "INSERT INTO prompt_responses (id, user_id, text) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(Uuid::now_v7())
        .bind(user_id)
        .bind(text)
        .fetch_one(&self.pool)
        .await?;
        Ok(response)
    }

    async fn find_response_by_id(
        &self,
        id: &Uuid,
    ) -> Result<Option<PromptResponseEntity>, error::SystemError> {
        let response =
            sqlx::query_as::<_, PromptResponseEntity>("SELECT * FROM prompt_responses WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(response)
    }

    async fn delete_response(&self, id: &Uuid) -> Result<bool, error::SystemError> {
        let rows = sqlx::query("DELETE FROM prompt_responses WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(rows > 0)
    }

    async fn find_latest_responses(
        &self,
        user_ids: &[Uuid],
    ) -> Result<Vec<PromptResponseEntity>, error::SystemError> {
        if user_ids.is_empty() {
            return Ok(vec![]);
        }

        let responses = sqlx::query_as::<_, PromptResponseEntity>(
            r#"
            SELECT DISTINCT ON (user_id) *
            FROM prompt_responses
            WHERE user_id = ANY($1)
            ORDER BY user_id, created_at DESC
            "#,
        )
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(responses)
    }

    async fn find_responses_since(
        &self,
        user_ids: &[Uuid],
        since: &chrono::DateTime<chrono::Utc>,
    ) -> Result<Vec<PromptResponseEntity>, error::SystemError> {
        if user_ids.is_empty() {
            return Ok(vec![]);
        }

        let responses = sqlx::query_as::<_, PromptResponseEntity>(
            r#"
            SELECT *
            FROM prompt_responses
            WHERE user_id = ANY($1) AND created_at > $2
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_ids)
        .bind(since)
        .fetch_all(&self.pool)
        .await?;
        Ok(responses)
    }

    async fn toggle_like(
        &self,
        response_id: &Uuid,
        user_id: &Uuid,
    ) -> Result<Option<PromptResponseEntity>, error::SystemError> {
        let response = sqlx::query_as::<_, PromptResponseEntity>(
            r#"
            UPDATE prompt_responses
            SET
                likes = CASE WHEN $2 = ANY(liked_by) THEN likes - 1 ELSE likes + 1 END,
                liked_by = CASE
                    WHEN $2 = ANY(liked_by) THEN array_remove(liked_by, $2)
                    ELSE array_append(liked_by, $2)
                END
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(response_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(response)
    }
}
