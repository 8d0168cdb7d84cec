use actix_web::{HttpRequest, get, post, web};

use crate::{
    api::{error, success},
    middlewares::get_claims,
    modules::{
        prompt::repository_pg::PromptRepositoryPg,
        report::{
            model::CreateReportModel, repository_pg::ReportRepositoryPg, schema::ReportEntity,
            service::ReportService,
        },
        user::repository_pg::UserRepositoryPg,
    },
    utils::ValidatedJson,
};

pub type ReportSvc = ReportService<ReportRepositoryPg, UserRepositoryPg, PromptRepositoryPg>;

#[post("")]
pub async fn create_report(
    report_service: web::Data<ReportSvc>,
    body: ValidatedJson<CreateReportModel>,
    req: HttpRequest,
) -> Result<success::Success<ReportEntity>, error::Error> {
    let reporter_id = get_claims(&req)?.sub;
    let report = report_service.create_report(reporter_id, body.0).await?;
    Ok(success::Success::created(Some(report)).message("Report submitted"))
}

#[get("")]
pub async fn list_my_reports(
    report_service: web::Data<ReportSvc>,
    req: HttpRequest,
) -> Result<success::Success<Vec<ReportEntity>>, error::Error> {
    let reporter_id = get_claims(&req)?.sub;
    let reports = report_service.list_my_reports(reporter_id).await?;
    Ok(success::Success::ok(Some(reports)))
}

#[get("")]
pub async fn list_reports(
    report_service: web::Data<ReportSvc>,
) -> Result<success::Success<Vec<ReportEntity>>, error::Error> {
    let reports = report_service.list_reports().await?;
    Ok(success::Success::ok(Some(reports)))
}
