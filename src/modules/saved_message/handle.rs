use actix_web::{HttpRequest, delete, get, post, web};
use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    api::{error, success},
    middlewares::get_claims,
    modules::{
        friend::repository_pg::FriendRepositoryPg,
        saved_message::{
            model::{DayQuery, MonthQuery, SaveMessageModel},
            repository_pg::SavedMessageRepositoryPg,
            schema::SavedMessageEntity,
            service::SavedMessageService,
        },
    },
    utils::{ValidatedJson, ValidatedQuery},
};

pub type SavedMessageSvc = SavedMessageService<SavedMessageRepositoryPg, FriendRepositoryPg>;

#[post("")]
pub async fn save_message(
    saved_message_service: web::Data<SavedMessageSvc>,
    body: ValidatedJson<SaveMessageModel>,
    req: HttpRequest,
) -> Result<success::Success<SavedMessageEntity>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    let saved = saved_message_service.save(user_id, body.0).await?;
    Ok(success::Success::created(Some(saved)).message("Message saved successfully"))
}

#[get("/{other_id}")]
pub async fn list_for_day(
    saved_message_service: web::Data<SavedMessageSvc>,
    other_id: web::Path<Uuid>,
    query: ValidatedQuery<DayQuery>,
    req: HttpRequest,
) -> Result<success::Success<Vec<SavedMessageEntity>>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    let messages = saved_message_service.list_for_day(user_id, *other_id, query.0.date).await?;
    Ok(success::Success::ok(Some(messages)))
}

#[get("/{other_id}/days")]
pub async fn list_days(
    saved_message_service: web::Data<SavedMessageSvc>,
    other_id: web::Path<Uuid>,
    query: ValidatedQuery<MonthQuery>,
    req: HttpRequest,
) -> Result<success::Success<Vec<NaiveDate>>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    let days = saved_message_service.list_days(user_id, *other_id, &query.0.month).await?;
    Ok(success::Success::ok(Some(days)))
}

#[delete("/{message_id}")]
pub async fn delete_saved_message(
    saved_message_service: web::Data<SavedMessageSvc>,
    message_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    saved_message_service.delete(user_id, *message_id).await?;
    Ok(success::Success::no_content())
}
