use uuid::Uuid;

use crate::{
    api::error,
    modules::report::{repository::ReportRepository, schema::ReportEntity},
};

#[derive(Clone)]
pub struct ReportRepositoryPg {
    pool: sqlx::PgPool,
}

impl ReportRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ReportRepository for ReportRepositoryPg {
    async fn create(&self, report: &ReportEntity) -> Result<ReportEntity, error::SystemError> {
        let report = sqlx::query_as::<_, ReportEntity>(
            r#"
            INSERT INTO reports (id, reporter_id, reported_user_id, response_id, reason, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(report.id)
        .bind(report.reporter_id)
        .bind(report.reported_user_id)
        .bind(report.response_id)
        .bind(&report.reason)
        .bind(report.created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(report)
    }

    async fn find_by_reporter(
        &self,
        reporter_id: &Uuid,
    ) -> Result<Vec<ReportEntity>, error::SystemError> {
        let reports = sqlx::query_as::<_, ReportEntity>(
            "SELECT * FROM reports WHERE reporter_id = $1 ORDER BY created_at DESC",
        )
        .bind(reporter_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(reports)
    }

    async fn find_all(&self) -> Result<Vec<ReportEntity>, error::SystemError> {
        let reports =
            sqlx::query_as::<_, ReportEntity>("SELECT * FROM reports ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?;
        Ok(reports)
    }
}
