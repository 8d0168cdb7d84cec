use uuid::Uuid;

use crate::api::error;
use crate::modules::friend::model::{FriendSnapshot, UpdateFriendFlags};
use crate::modules::friend::schema::{FriendEdgeEntity, FriendRequestEntity};

#[async_trait::async_trait]
pub trait FriendRepository {
    async fn find_edge(
        &self,
        owner_id: &Uuid,
        friend_id: &Uuid,
    ) -> Result<Option<FriendEdgeEntity>, error::SystemError>;

    async fn find_friends(&self, owner_id: &Uuid)
    -> Result<Vec<FriendEdgeEntity>, error::SystemError>;

    async fn find_friend_ids(&self, owner_id: &Uuid) -> Result<Vec<Uuid>, error::SystemError>;

    /// Edges other users hold about `friend_id`, i.e. its mirrored copies.
    async fn find_edges_to(
        &self,
        friend_id: &Uuid,
    ) -> Result<Vec<FriendEdgeEntity>, error::SystemError>;

    /// Inserts the edge or refreshes its snapshot. Returns `true` when it was created.
    async fn upsert_edge(
        &self,
        owner_id: &Uuid,
        friend: &FriendSnapshot,
    ) -> Result<bool, error::SystemError>;

    async fn delete_edge(&self, owner_id: &Uuid, friend_id: &Uuid)
    -> Result<bool, error::SystemError>;

    /// Removes both directions together.
    async fn delete_friendship(
        &self,
        user_id_a: &Uuid,
        user_id_b: &Uuid,
    ) -> Result<bool, error::SystemError>;

    async fn update_flags(
        &self,
        owner_id: &Uuid,
        friend_id: &Uuid,
        flags: &UpdateFriendFlags,
    ) -> Result<Option<FriendEdgeEntity>, error::SystemError>;

    /// Rewrites every mirrored copy of `snapshot.id`. Returns the number of copies touched.
    async fn propagate_profile(&self, snapshot: &FriendSnapshot)
    -> Result<u64, error::SystemError>;
}

#[async_trait::async_trait]
pub trait FriendRequestRepository {
    async fn find_request(
        &self,
        to_user_id: &Uuid,
        from_user_id: &Uuid,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError>;

    async fn find_requests_to(
        &self,
        to_user_id: &Uuid,
    ) -> Result<Vec<FriendRequestEntity>, error::SystemError>;

    async fn create_request(
        &self,
        to_user_id: &Uuid,
        sender: &FriendSnapshot,
    ) -> Result<FriendRequestEntity, error::SystemError>;

    async fn delete_request(
        &self,
        to_user_id: &Uuid,
        from_user_id: &Uuid,
    ) -> Result<bool, error::SystemError>;
}

#[async_trait::async_trait]
pub trait FriendRepo: FriendRepository + FriendRequestRepository + Send + Sync {
    /// Creates both edges and consumes the request, all or nothing.
    /// Returns the receiver's new edge pointing at the sender.
    async fn accept_friend_request_atomic(
        &self,
        receiver: &FriendSnapshot,
        sender: &FriendSnapshot,
    ) -> Result<FriendEdgeEntity, error::SystemError>;
}
