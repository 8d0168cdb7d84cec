use serde::Serialize;
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SavedMessageEntity {
    /// Id of the chat message this is a copy of
    pub id: Uuid,
    pub from_user_id: Uuid,
    pub to_user_id: Uuid,
    pub content: String,
    pub sent_at: chrono::DateTime<chrono::Utc>,
    pub saved_at: chrono::DateTime<chrono::Utc>,
}

impl SavedMessageEntity {
    pub fn involves(&self, user_id: &Uuid) -> bool {
        self.from_user_id == *user_id || self.to_user_id == *user_id
    }
}
