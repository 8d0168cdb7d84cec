use log::warn;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    api::error,
    modules::{
        prompt::repository::PromptRepository,
        report::{model::CreateReportModel, repository::ReportRepository, schema::ReportEntity},
        user::repository::UserRepository,
    },
};

#[derive(Clone)]
pub struct ReportService<R, U, P>
where
    R: ReportRepository + Send + Sync,
    U: UserRepository + Send + Sync,
    P: PromptRepository + Send + Sync,
{
    report_repo: Arc<R>,
    user_repo: Arc<U>,
    prompt_repo: Arc<P>,
}

impl<R, U, P> ReportService<R, U, P>
where
    R: ReportRepository + Send + Sync,
    U: UserRepository + Send + Sync,
    P: PromptRepository + Send + Sync,
{
    pub fn with_dependencies(report_repo: Arc<R>, user_repo: Arc<U>, prompt_repo: Arc<P>) -> Self {
        ReportService { report_repo, user_repo, prompt_repo }
    }

    pub async fn create_report(
        &self,
        reporter_id: Uuid,
        report: CreateReportModel,
    ) -> Result<ReportEntity, error::SystemError> {
        let reason = report.reason.trim();
        if reason.is_empty() {
            return Err(error::SystemError::bad_request("Reason cannot be empty"));
        }

        if report.reported_user_id == reporter_id {
            return Err(error::SystemError::bad_request("You cannot report yourself"));
        }

        if self.user_repo.find_by_id(&report.reported_user_id).await?.is_none() {
            return Err(error::SystemError::not_found("Reported user not found"));
        }

        if let Some(response_id) = report.response_id {
            let belongs = self
                .prompt_repo
                .find_response_by_id(&response_id)
                .await?
                .is_some_and(|response| response.user_id == report.reported_user_id);

            if !belongs {
                return Err(error::SystemError::bad_request(
                    "Response does not belong to the reported user",
                ));
            }
        }

        let entity = ReportEntity {
            id: Uuid::now_v7(),
            reporter_id,
            reported_user_id: report.reported_user_id,
            response_id: report.response_id,
            reason: reason.to_string(),
            created_at: chrono::Utc::now(),
        };

        let created = self.report_repo.create(&entity).await?;
        warn!("User {} reported user {} ({})", reporter_id, created.reported_user_id, created.id);
        Ok(created)
    }

    pub async fn list_my_reports(
        &self,
        reporter_id: Uuid,
    ) -> Result<Vec<ReportEntity>, error::SystemError> {
        self.report_repo.find_by_reporter(&reporter_id).await
    }

    pub async fn list_reports(&self) -> Result<Vec<ReportEntity>, error::SystemError> {
        self.report_repo.find_all().await
    }
}
