use serde::Serialize;
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BasicInfoEntity {
    pub user_id: Uuid,
    pub bio: Option<String>,
    pub age: Option<i16>,
    pub pronouns: Option<String>,
    pub location: Option<String>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl BasicInfoEntity {
    /// What a user who never filled in the form reads back.
    pub fn empty(user_id: Uuid) -> Self {
        BasicInfoEntity {
            user_id,
            bio: None,
            age: None,
            pronouns: None,
            location: None,
            updated_at: chrono::DateTime::default(),
        }
    }
}
