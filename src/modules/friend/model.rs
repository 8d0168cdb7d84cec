use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::modules::{
    friend::schema::{FriendEdgeEntity, FriendRequestEntity, FriendRequestStatus},
    user::schema::UserEntity,
};

/// The public fields of a user that get denormalized into edges and requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendSnapshot {
    pub id: Uuid,
    pub username: String,
    pub profile_image_url: Option<String>,
}

impl From<&UserEntity> for FriendSnapshot {
    fn from(user: &UserEntity) -> Self {
        FriendSnapshot {
            id: user.id,
            username: user.username.clone(),
            profile_image_url: user.profile_image_url.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendResponse {
    pub id: Uuid,
    pub username: String,
    pub profile_image_url: Option<String>,
    pub is_pinned: bool,
    pub is_muted: bool,
    pub since: chrono::DateTime<chrono::Utc>,
}

impl From<FriendEdgeEntity> for FriendResponse {
    fn from(edge: FriendEdgeEntity) -> Self {
        FriendResponse {
            id: edge.friend_id,
            username: edge.username,
            profile_image_url: edge.profile_image_url,
            is_pinned: edge.is_pinned,
            is_muted: edge.is_muted,
            since: edge.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequestResponse {
    pub from: FriendSnapshot,
    pub status: FriendRequestStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<FriendRequestEntity> for FriendRequestResponse {
    fn from(request: FriendRequestEntity) -> Self {
        FriendRequestResponse {
            from: FriendSnapshot {
                id: request.from_user_id,
                username: request.username,
                profile_image_url: request.profile_image_url,
            },
            status: request.status,
            created_at: request.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequestBody {
    pub recipient_id: Uuid,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFriendFlags {
    pub is_pinned: Option<bool>,
    pub is_muted: Option<bool>,
}

impl UpdateFriendFlags {
    pub fn is_empty(&self) -> bool {
        self.is_pinned.is_none() && self.is_muted.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReconcileReport {
    pub created: u64,
    pub refreshed: u64,
    pub removed: u64,
}
