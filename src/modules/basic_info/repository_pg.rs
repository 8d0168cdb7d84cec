use uuid::Uuid;

use crate::{
    api::error,
    modules::basic_info::{
        model::BasicInfoModel, repository::BasicInfoRepository, schema::BasicInfoEntity,
    },
};

#[derive(Clone)]
pub struct BasicInfoRepositoryPg {
    pool: sqlx::PgPool,
}

impl BasicInfoRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl BasicInfoRepository for BasicInfoRepositoryPg {
    async fn find_by_user(
        &self,
        user_id: &Uuid,
    ) -> Result<Option<BasicInfoEntity>, error::SystemError> {
        let info = sqlx::query_as::<_, BasicInfoEntity>(
            "SELECT * FROM basic_information WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(info)
    }

    async fn upsert(
        &self,
        user_id: &Uuid,
        info: &BasicInfoModel,
    ) -> Result<BasicInfoEntity, error::SystemError> {
        let info = sqlx::query_as::<_, BasicInfoEntity>(
            r#"
            INSERT INTO basic_information (user_id, bio, age, pronouns, location, updated_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            ON CONFLICT (user_id) DO UPDATE
            SET bio        = EXCLUDED.bio,
                age        = EXCLUDED.age,
                pronouns   = EXCLUDED.pronouns,
                location   = EXCLUDED.location,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&info.bio)
        .bind(info.age)
        .bind(&info.pronouns)
        .bind(&info.location)
        .fetch_one(&self.pool)
        .await?;
        Ok(info)
    }
}
