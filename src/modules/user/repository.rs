use uuid::Uuid;

use crate::{
    api::error,
    modules::user::{
        model::{InsertUser, UpdateProfile},
        schema::UserEntity,
    },
};

#[async_trait::async_trait]
pub trait UserRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<UserEntity>, error::SystemError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>, error::SystemError>;

    async fn create(&self, user: &InsertUser) -> Result<Uuid, error::SystemError>;

    async fn update_profile(
        &self,
        id: &Uuid,
        update: &UpdateProfile,
    ) -> Result<UserEntity, error::SystemError>;

    async fn set_fcm_token(&self, id: &Uuid, token: &str) -> Result<(), error::SystemError>;

    async fn set_has_posted(&self, id: &Uuid, has_posted: bool) -> Result<(), error::SystemError>;

    /// Locks every feed again, used when a new prompt goes live.
    async fn reset_has_posted_all(&self) -> Result<u64, error::SystemError>;

    /// Hard delete. Edges, requests, responses and cursors go with it.
    async fn delete(&self, id: &Uuid) -> Result<bool, error::SystemError>;

    /// Case-insensitive partial match on username
    async fn search_users(
        &self,
        query: &str,
        limit: i64,
    ) -> Result<Vec<UserEntity>, error::SystemError>;
}
