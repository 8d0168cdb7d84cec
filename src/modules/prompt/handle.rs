use actix_web::{HttpRequest, delete, get, post, put, web};
use uuid::Uuid;

use crate::{
    api::{error, success},
    middlewares::get_claims,
    modules::{
        activity::repository_pg::ActivityRepositoryPg,
        friend::repository_pg::FriendRepositoryPg,
        prompt::{
            model::{FeedResponse, LikeResponse, PostResponseModel, SetPromptModel},
            repository_pg::PromptRepositoryPg,
            schema::{PromptEntity, PromptResponseEntity},
            service::PromptService,
        },
        user::repository_pg::UserRepositoryPg,
    },
    utils::ValidatedJson,
};

pub type PromptSvc =
    PromptService<PromptRepositoryPg, FriendRepositoryPg, UserRepositoryPg, ActivityRepositoryPg>;

#[get("/current")]
pub async fn get_current_prompt(
    prompt_service: web::Data<PromptSvc>,
) -> Result<success::Success<PromptEntity>, error::Error> {
    let prompt = prompt_service.get_current_prompt().await?;
    Ok(success::Success::ok(Some(prompt)).message("Prompt retrieved successfully"))
}

#[put("/current")]
pub async fn set_current_prompt(
    prompt_service: web::Data<PromptSvc>,
    body: ValidatedJson<SetPromptModel>,
) -> Result<success::Success<PromptEntity>, error::Error> {
    let prompt = prompt_service.set_current_prompt(&body.0.text).await?;
    Ok(success::Success::ok(Some(prompt)).message("Prompt published successfully"))
}

#[post("/responses")]
pub async fn post_response(
    prompt_service: web::Data<PromptSvc>,
    body: ValidatedJson<PostResponseModel>,
    req: HttpRequest,
) -> Result<success::Success<PromptResponseEntity>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    let response = prompt_service.post_response(user_id, &body.0.text).await?;

    Ok(success::Success::created(Some(response)).message("Response posted successfully"))
}

#[delete("/responses/{response_id}")]
pub async fn delete_response(
    prompt_service: web::Data<PromptSvc>,
    response_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    prompt_service.delete_response(user_id, *response_id).await?;
    Ok(success::Success::no_content())
}

#[post("/responses/{response_id}/like")]
pub async fn toggle_like(
    prompt_service: web::Data<PromptSvc>,
    response_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<LikeResponse>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    let like = prompt_service.toggle_like(user_id, *response_id).await?;
    Ok(success::Success::ok(Some(like)))
}

#[get("/feed")]
pub async fn get_feed(
    prompt_service: web::Data<PromptSvc>,
    req: HttpRequest,
) -> Result<success::Success<FeedResponse>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    let feed = prompt_service.get_feed(user_id).await?;
    Ok(success::Success::ok(Some(feed)).message("Feed retrieved successfully"))
}
