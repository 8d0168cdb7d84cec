use actix_web::{HttpRequest, get, post, web};

use crate::{
    api::{error, success},
    middlewares::get_claims,
    modules::{
        activity::{
            model::ActivityBadgeResponse, repository_pg::ActivityRepositoryPg,
            service::ActivityService,
        },
        friend::repository_pg::FriendRepositoryPg,
        prompt::repository_pg::PromptRepositoryPg,
    },
};

pub type ActivitySvc = ActivityService<ActivityRepositoryPg, FriendRepositoryPg, PromptRepositoryPg>;

#[get("")]
pub async fn get_activity(
    activity_service: web::Data<ActivitySvc>,
    req: HttpRequest,
) -> Result<success::Success<ActivityBadgeResponse>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    let badge = activity_service.evaluate(user_id).await?;
    Ok(success::Success::ok(Some(badge)))
}

#[post("/seen")]
pub async fn mark_seen(
    activity_service: web::Data<ActivitySvc>,
    req: HttpRequest,
) -> Result<success::Success<ActivityBadgeResponse>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    let badge = activity_service.mark_seen(user_id).await?;
    Ok(success::Success::ok(Some(badge)).message("Activity marked as seen"))
}
