use uuid::Uuid;

use crate::{api::error, modules::saved_message::schema::SavedMessageEntity};

#[async_trait::async_trait]
pub trait SavedMessageRepository {
    /// Fails with `Conflict` when the message was already saved.
    async fn create(
        &self,
        message: &SavedMessageEntity,
    ) -> Result<SavedMessageEntity, error::SystemError>;

    async fn find_by_id(&self, id: &Uuid)
    -> Result<Option<SavedMessageEntity>, error::SystemError>;

    /// Messages between the pair in either direction with `from <= sent_at < to`,
    /// oldest first.
    async fn find_between(
        &self,
        user_a: &Uuid,
        user_b: &Uuid,
        from: &chrono::DateTime<chrono::Utc>,
        to: &chrono::DateTime<chrono::Utc>,
    ) -> Result<Vec<SavedMessageEntity>, error::SystemError>;

    async fn delete(&self, id: &Uuid) -> Result<bool, error::SystemError>;
}
