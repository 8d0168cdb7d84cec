use actix_web::{HttpRequest, delete, get, patch, post, web};
use uuid::Uuid;

use crate::{
    api::{error, success},
    middlewares::get_claims,
    modules::{
        friend::{
            model::{
                FriendRequestBody, FriendRequestResponse, FriendResponse, ReconcileReport,
                UpdateFriendFlags,
            },
            repository_pg::FriendRepositoryPg,
            schema::FriendRequestEntity,
            service::FriendService,
        },
        user::repository_pg::UserRepositoryPg,
    },
    utils::ValidatedJson,
};

pub type FriendSvc = FriendService<FriendRepositoryPg, UserRepositoryPg>;

#[post("/requests")]
pub async fn send_friend_request(
    friend_service: web::Data<FriendSvc>,
    body: ValidatedJson<FriendRequestBody>,
    req: HttpRequest,
) -> Result<success::Success<FriendRequestEntity>, error::Error> {
    let sender_id = get_claims(&req)?.sub;
    let request = friend_service.send_friend_request(sender_id, body.0.recipient_id).await?;

    Ok(success::Success::created(Some(request)).message("Friend request sent successfully"))
}

#[post("/requests/{from_user_id}/accept")]
pub async fn accept_friend_request(
    friend_service: web::Data<FriendSvc>,
    from_user_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<FriendResponse>, error::Error> {
    let receiver_id = get_claims(&req)?.sub;
    let response = friend_service.accept_friend_request(receiver_id, *from_user_id).await?;

    Ok(success::Success::ok(Some(response)).message("Friend request accepted successfully"))
}

#[post("/requests/{from_user_id}/reject")]
pub async fn reject_friend_request(
    friend_service: web::Data<FriendSvc>,
    from_user_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let receiver_id = get_claims(&req)?.sub;
    friend_service.reject_friend_request(receiver_id, *from_user_id).await?;
    Ok(success::Success::no_content())
}

#[get("/requests")]
pub async fn list_friend_requests(
    friend_service: web::Data<FriendSvc>,
    req: HttpRequest,
) -> Result<success::Success<Vec<FriendRequestResponse>>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    let requests = friend_service.get_friend_requests(user_id).await?;

    Ok(success::Success::ok(Some(requests)).message("Friend requests retrieved successfully"))
}

#[get("")]
pub async fn list_friends(
    friend_service: web::Data<FriendSvc>,
    req: HttpRequest,
) -> Result<success::Success<Vec<FriendResponse>>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    let friends = friend_service.get_friends(user_id).await?;

    Ok(success::Success::ok(Some(friends)).message("Friends retrieved successfully"))
}

#[patch("/{friend_id}")]
pub async fn update_friend(
    friend_service: web::Data<FriendSvc>,
    friend_id: web::Path<Uuid>,
    body: ValidatedJson<UpdateFriendFlags>,
    req: HttpRequest,
) -> Result<success::Success<FriendResponse>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    let friend = friend_service.update_friend_flags(user_id, *friend_id, body.0).await?;

    Ok(success::Success::ok(Some(friend)).message("Friend updated successfully"))
}

#[delete("/{friend_id}")]
pub async fn remove_friend(
    friend_service: web::Data<FriendSvc>,
    friend_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    friend_service.remove_friend(user_id, *friend_id).await?;
    Ok(success::Success::no_content())
}

#[post("/reconcile")]
pub async fn reconcile_friends(
    friend_service: web::Data<FriendSvc>,
    req: HttpRequest,
) -> Result<success::Success<ReconcileReport>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    let report = friend_service.reconcile(user_id).await?;

    Ok(success::Success::ok(Some(report)).message("Friend list reconciled"))
}
