use uuid::Uuid;

use crate::{api::error, modules::report::schema::ReportEntity};

#[async_trait::async_trait]
pub trait ReportRepository {
    async fn create(&self, report: &ReportEntity) -> Result<ReportEntity, error::SystemError>;

    /// Newest first.
    async fn find_by_reporter(
        &self,
        reporter_id: &Uuid,
    ) -> Result<Vec<ReportEntity>, error::SystemError>;

    async fn find_all(&self) -> Result<Vec<ReportEntity>, error::SystemError>;
}
