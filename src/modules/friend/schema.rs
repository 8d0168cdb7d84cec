use serde::{Deserialize, Serialize};
use sqlx::prelude::{FromRow, Type};
use uuid::Uuid;

/// One side of a friendship: `owner_id`'s copy of `friend_id`'s public fields.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FriendEdgeEntity {
    pub owner_id: Uuid,
    pub friend_id: Uuid,
    pub username: String,
    pub profile_image_url: Option<String>,
    pub is_pinned: bool,
    pub is_muted: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, PartialEq, Clone, Copy, Type, Serialize, Deserialize)]
#[sqlx(type_name = "friend_request_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FriendRequestStatus {
    Pending,
}

/// Pending request in `to_user_id`'s mailbox, carrying the sender's snapshot.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FriendRequestEntity {
    pub to_user_id: Uuid,
    pub from_user_id: Uuid,
    pub username: String,
    pub profile_image_url: Option<String>,
    pub status: FriendRequestStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
