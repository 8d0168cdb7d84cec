use uuid::Uuid;

use crate::{
    api::error,
    modules::user::{
        model::{InsertUser, UpdateProfile},
        repository::UserRepository,
        schema::UserEntity,
    },
};

#[derive(Clone)]
pub struct UserRepositoryPg {
    pool: sqlx::PgPool,
}

impl UserRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl UserRepository for UserRepositoryPg {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<UserEntity>, error::SystemError> {
        let user = sqlx::query_as::<_, UserEntity>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>, error::SystemError> {
        let user = sqlx::query_as::<_, UserEntity>(
            "SELECT * FROM users WHERE lower(email) = lower($1)",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create(&self, user: &InsertUser) -> Result<Uuid, error::SystemError> {
        let id = Uuid::now_v7();
        sqlx::query(
            "INSERT INTO users (id, username, email, hash_password) VALUES ($1, $2, $3, $4)",
        )
        .bind(id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.hash_password)
        .execute(&self.pool)
        .await?;
        Ok(id)
    }

    async fn update_profile(
        &self,
        id: &Uuid,
        update: &UpdateProfile,
    ) -> Result<UserEntity, error::SystemError> {
        let user = sqlx::query_as::<_, UserEntity>(
            r#"
        UPDATE users
        SET
            username          = COALESCE($2, username),
            profile_image_url = CASE WHEN $3::boolean THEN $4 ELSE profile_image_url END,
            updated_at        = NOW()
        WHERE id = $1
        RETURNING *
        "#,
        )
        .bind(id)
        .bind(&update.username)
        .bind(update.profile_image_url.is_some())
        .bind(update.profile_image_url.as_ref().and_then(|v| v.as_ref()))
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| error::SystemError::not_found("User not found"))?;

        Ok(user)
    }

    async fn set_fcm_token(&self, id: &Uuid, token: &str) -> Result<(), error::SystemError> {
        let rows = sqlx::query("UPDATE users SET fcm_token = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(token)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if rows == 0 {
            return Err(error::SystemError::not_found("User not found"));
        }
        Ok(())
    }

    async fn set_has_posted(&self, id: &Uuid, has_posted: bool) -> Result<(), error::SystemError> {
        sqlx::query("UPDATE users SET has_posted = $2 WHERE id = $1")
            .bind(id)
            .bind(has_posted)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn reset_has_posted_all(&self) -> Result<u64, error::SystemError> {
        let rows = sqlx::query("UPDATE users SET has_posted = FALSE WHERE has_posted")
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(rows)
    }

    async fn delete(&self, id: &Uuid) -> Result<bool, error::SystemError> {
        let rows = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows > 0)
    }

    async fn search_users(
        &self,
        query: &str,
        limit: i64,
    ) -> Result<Vec<UserEntity>, error::SystemError> {
        let search_pattern = format!("%{}%", query.replace('%', "\\%").replace('_', "\\_"));
        let users = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT * FROM users
            WHERE lower(username) LIKE lower($1)
            ORDER BY username
            LIMIT $2
            "#,
        )
        .bind(&search_pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }
}
