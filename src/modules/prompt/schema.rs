use serde::Serialize;
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PromptEntity {
    pub text: String,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PromptResponseEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub text: String,
    pub likes: i32,
    pub liked_by: Vec<Uuid>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
