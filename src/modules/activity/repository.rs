use uuid::Uuid;

use crate::{api::error, modules::activity::schema::ActivityCursorEntity};

#[async_trait::async_trait]
pub trait ActivityRepository {
    async fn find_cursor(
        &self,
        user_id: &Uuid,
    ) -> Result<Option<ActivityCursorEntity>, error::SystemError>;

    /// Writes `cursor` only while the stored version still equals `cursor.version`.
    /// Returns `false` when another writer got there first.
    async fn save_cursor(&self, cursor: &ActivityCursorEntity) -> Result<bool, error::SystemError>;
}
