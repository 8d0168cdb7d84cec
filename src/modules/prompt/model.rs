use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::modules::prompt::schema::{PromptEntity, PromptResponseEntity};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SetPromptModel {
    #[validate(length(min = 1, max = 300, message = "Prompt must be 1 to 300 characters"))]
    pub text: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PostResponseModel {
    #[validate(length(min = 1, max = 500, message = "Response must be 1 to 500 characters"))]
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedItem {
    pub response_id: Uuid,
    pub author_id: Uuid,
    pub username: String,
    pub profile_image_url: Option<String>,
    pub text: String,
    pub likes: i32,
    pub liked_by_me: bool,
    pub is_new: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedResponse {
    pub prompt: Option<PromptEntity>,
    /// `false` until the viewer answers the current prompt; `items` is empty then.
    pub unlocked: bool,
    pub items: Vec<FeedItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeResponse {
    pub likes: i32,
    pub liked: bool,
}

impl LikeResponse {
    pub fn for_viewer(response: &PromptResponseEntity, viewer: &Uuid) -> Self {
        LikeResponse { likes: response.likes, liked: response.liked_by.contains(viewer) }
    }
}
