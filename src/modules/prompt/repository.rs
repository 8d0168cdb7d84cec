use uuid::Uuid;

use crate::{
    api::error,
    modules::prompt::schema::{PromptEntity, PromptResponseEntity},
};

#[async_trait::async_trait]
pub trait PromptRepository {
    async fn find_current_prompt(&self) -> Result<Option<PromptEntity>, error::SystemError>;

    async fn set_current_prompt(&self, text: &str) -> Result<PromptEntity, error::SystemError>;

    async fn create_response(
        &self,
        user_id: &Uuid,
        text: &str,
    ) -> Result<PromptResponseEntity, error::SystemError>;

    async fn find_response_by_id(
        &self,
        id: &Uuid,
    ) -> Result<Option<PromptResponseEntity>, error::SystemError>;

    async fn delete_response(&self, id: &Uuid) -> Result<bool, error::SystemError>;

    /// At most one response per user: the most recent one.
    async fn find_latest_responses(
        &self,
        user_ids: &[Uuid],
    ) -> Result<Vec<PromptResponseEntity>, error::SystemError>;

    /// Responses by `user_ids` strictly newer than `since`.
    async fn find_responses_since(
        &self,
        user_ids: &[Uuid],
        since: &chrono::DateTime<chrono::Utc>,
    ) -> Result<Vec<PromptResponseEntity>, error::SystemError>;

    /// Flips `user_id` in `liked_by` and moves `likes` with it in one write.
    async fn toggle_like(
        &self,
        response_id: &Uuid,
        user_id: &Uuid,
    ) -> Result<Option<PromptResponseEntity>, error::SystemError>;
}
