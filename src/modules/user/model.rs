use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{modules::user::schema::UserEntity, utils::double_option};

#[derive(Deserialize, Validate)]
pub struct SignUpModel {
    #[validate(length(min = 3, max = 30, message = "Username must be 3 to 30 characters long"))]
    pub username: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,
}

#[derive(Deserialize, Validate)]
pub struct SignInModel {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,
}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileModel {
    #[validate(length(min = 3, max = 30, message = "Username must be 3 to 30 characters long"))]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[validate(url(message = "Profile image must be a valid URL"))]
    pub profile_image_url: Option<Option<String>>,
}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FcmTokenModel {
    #[validate(length(min = 1, max = 4096, message = "FCM token cannot be empty"))]
    pub fcm_token: String,
}

#[derive(Deserialize, Validate)]
pub struct SearchUserQuery {
    #[validate(length(min = 1, max = 30, message = "Search query must be 1 to 30 characters"))]
    pub q: String,
    #[validate(range(min = 1, max = 50))]
    pub limit: Option<i64>,
}

pub struct InsertUser {
    pub username: String,
    pub email: String,
    pub hash_password: String,
}

/// `None` leaves the column untouched, `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct UpdateProfile {
    pub username: Option<String>,
    pub profile_image_url: Option<Option<String>>,
}

impl UpdateProfile {
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.profile_image_url.is_none()
    }
}

impl From<UpdateProfileModel> for UpdateProfile {
    fn from(model: UpdateProfileModel) -> Self {
        UpdateProfile { username: model.username, profile_image_url: model.profile_image_url }
    }
}

#[derive(Serialize)]
pub struct SignUpResponse {
    pub id: Uuid,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInResponse {
    pub access_token: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub profile_image_url: Option<String>,
    pub has_posted: bool,
    pub latest_message_timestamp: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<UserEntity> for UserResponse {
    fn from(entity: UserEntity) -> Self {
        UserResponse {
            id: entity.id,
            username: entity.username,
            email: entity.email,
            profile_image_url: entity.profile_image_url,
            has_posted: entity.has_posted,
            latest_message_timestamp: entity.latest_message_timestamp,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSearchResponse {
    pub id: Uuid,
    pub username: String,
    pub profile_image_url: Option<String>,
}

impl From<UserEntity> for UserSearchResponse {
    fn from(entity: UserEntity) -> Self {
        UserSearchResponse {
            id: entity.id,
            username: entity.username,
            profile_image_url: entity.profile_image_url,
        }
    }
}
