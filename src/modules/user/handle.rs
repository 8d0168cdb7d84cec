use actix_web::{
    HttpRequest,
    cookie::{Cookie, time},
    delete, get, patch, post, put, web,
};
use uuid::Uuid;

use crate::api::{error, success};
use crate::constants::{USER_SEARCH_LIMIT, USER_SEARCH_MAX_LIMIT};
use crate::modules::friend::{handle::FriendSvc, model::FriendSnapshot};
use crate::modules::user::{model, service::UserService};
use crate::utils::{ValidatedJson, ValidatedQuery};
use crate::{ENV, middlewares::get_claims};

fn refresh_cookie(token: String) -> Cookie<'static> {
    Cookie::build("refresh_token", token)
        .path("/")
        .http_only(true)
        .max_age(time::Duration::seconds(ENV.refresh_token_expiration as i64))
        .finish()
}

#[get("/profile")]
pub async fn get_profile(
    user_service: web::Data<UserService>,
    req: HttpRequest,
) -> Result<success::Success<model::UserResponse>, error::Error> {
    let id = get_claims(&req)?.sub;
    let user = user_service.get_by_id(id).await?;
    Ok(success::Success::ok(Some(user)).message("Profile retrieved successfully"))
}

#[get("/search")]
pub async fn search_users(
    user_service: web::Data<UserService>,
    query: ValidatedQuery<model::SearchUserQuery>,
) -> Result<success::Success<Vec<model::UserSearchResponse>>, error::Error> {
    let limit = query.0.limit.unwrap_or(USER_SEARCH_LIMIT).min(USER_SEARCH_MAX_LIMIT);
    let users = user_service.search(&query.0.q, limit).await?;
    Ok(success::Success::ok(Some(users)))
}

#[get("/{id:[0-9a-fA-F-]{36}}")]
pub async fn get_user(
    user_service: web::Data<UserService>,
    user_id: web::Path<Uuid>,
) -> Result<success::Success<model::UserResponse>, error::Error> {
    let user = user_service.get_by_id(user_id.into_inner()).await?;
    Ok(success::Success::ok(Some(user)).message("User retrieved successfully"))
}

/// Updates the profile, then rewrites every copy friends hold of it.
#[patch("/profile")]
pub async fn update_profile(
    user_service: web::Data<UserService>,
    friend_service: web::Data<FriendSvc>,
    body: ValidatedJson<model::UpdateProfileModel>,
    req: HttpRequest,
) -> Result<success::Success<model::UserResponse>, error::Error> {
    let id = get_claims(&req)?.sub;
    let user = user_service.update_profile(id, body.0.into()).await?;
    friend_service.propagate_profile(&FriendSnapshot::from(&user)).await?;

    Ok(success::Success::ok(Some(model::UserResponse::from(user)))
        .message("Profile updated successfully"))
}

#[put("/fcm-token")]
pub async fn set_fcm_token(
    user_service: web::Data<UserService>,
    body: ValidatedJson<model::FcmTokenModel>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let id = get_claims(&req)?.sub;
    user_service.set_fcm_token(id, &body.0.fcm_token).await?;
    Ok(success::Success::no_content())
}

#[delete("/profile")]
pub async fn delete_account(
    user_service: web::Data<UserService>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let id = get_claims(&req)?.sub;
    user_service.delete_account(id).await?;

    let refresh_token = req.cookie("refresh_token").map(|c| c.value().to_string());
    user_service.sign_out(refresh_token).await?;
    Ok(success::Success::no_content())
}

#[post("/signup")]
pub async fn sign_up(
    user_service: web::Data<UserService>,
    user_data: ValidatedJson<model::SignUpModel>,
) -> Result<success::Success<model::SignUpResponse>, error::Error> {
    let user_id = user_service.sign_up(user_data.0).await?;
    Ok(success::Success::created(Some(model::SignUpResponse { id: user_id }))
        .message("Signup successful"))
}

#[post("/signin")]
pub async fn sign_in(
    user_service: web::Data<UserService>,
    user_data: ValidatedJson<model::SignInModel>,
) -> Result<success::Success<model::SignInResponse>, error::Error> {
    let (access_token, refresh_token) = user_service.sign_in(user_data.0).await?;

    Ok(success::Success::ok(Some(model::SignInResponse { access_token }))
        .message("Signin successful")
        .cookies(vec![refresh_cookie(refresh_token)]))
}

#[post("/signout")]
pub async fn sign_out(
    user_service: web::Data<UserService>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let refresh_token = req.cookie("refresh_token").map(|c| c.value().to_string());
    user_service.sign_out(refresh_token).await?;

    let cleared = Cookie::build("refresh_token", "")
        .path("/")
        .http_only(true)
        .max_age(time::Duration::seconds(0))
        .expires(time::OffsetDateTime::UNIX_EPOCH)
        .finish();

    Ok(success::Success::no_content().cookies(vec![cleared]))
}

#[post("/refresh")]
pub async fn refresh(
    user_service: web::Data<UserService>,
    req: HttpRequest,
) -> Result<success::Success<model::SignInResponse>, error::Error> {
    let refresh_token = req.cookie("refresh_token").map(|c| c.value().to_string());
    let (access_token, refresh_token) = user_service.refresh(refresh_token).await?;

    Ok(success::Success::ok(Some(model::SignInResponse { access_token }))
        .message("Refresh successful")
        .cookies(vec![refresh_cookie(refresh_token)]))
}
