use log::{info, warn};
use std::collections::HashSet;
use std::sync::Arc;

use uuid::Uuid;

use crate::{
    api::error,
    modules::{
        friend::{
            model::{
                FriendRequestResponse, FriendResponse, FriendSnapshot, ReconcileReport,
                UpdateFriendFlags,
            },
            repository::FriendRepo,
            schema::FriendRequestEntity,
        },
        user::{repository::UserRepository, schema::UserEntity},
        websocket::{message::ServerMessage, publisher::EventPublisher},
    },
};

#[derive(Clone)]
pub struct FriendService<R, U>
where
    R: FriendRepo + Send + Sync,
    U: UserRepository + Send + Sync,
{
    friend_repo: Arc<R>,
    user_repo: Arc<U>,
    publisher: Arc<dyn EventPublisher>,
}

impl<R, U> FriendService<R, U>
where
    R: FriendRepo + Send + Sync,
    U: UserRepository + Send + Sync,
{
    pub fn with_dependencies(
        friend_repo: Arc<R>,
        user_repo: Arc<U>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        FriendService { friend_repo, user_repo, publisher }
    }

    async fn require_user(&self, id: &Uuid) -> Result<UserEntity, error::SystemError> {
        self.user_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("User not found"))
    }

    pub async fn get_friends(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<FriendResponse>, error::SystemError> {
        let mut friends = self.friend_repo.find_friends(&user_id).await?;
        friends.sort_by(|a, b| {
            b.is_pinned
                .cmp(&a.is_pinned)
                .then_with(|| a.username.to_lowercase().cmp(&b.username.to_lowercase()))
        });
        Ok(friends.into_iter().map(FriendResponse::from).collect())
    }

    pub async fn remove_friend(
        &self,
        user_id: Uuid,
        friend_id: Uuid,
    ) -> Result<(), error::SystemError> {
        if !self.friend_repo.delete_friendship(&user_id, &friend_id).await? {
            return Err(error::SystemError::not_found("Friend not found"));
        }

        info!("User {} removed friend {}", user_id, friend_id);
        self.publisher.send_to_user(friend_id, ServerMessage::FriendRemoved { user_id });
        Ok(())
    }

    pub async fn update_friend_flags(
        &self,
        user_id: Uuid,
        friend_id: Uuid,
        flags: UpdateFriendFlags,
    ) -> Result<FriendResponse, error::SystemError> {
        if flags.is_empty() {
            return Err(error::SystemError::bad_request("No fields to update"));
        }

        let edge = self
            .friend_repo
            .update_flags(&user_id, &friend_id, &flags)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Friend not found"))?;

        Ok(FriendResponse::from(edge))
    }

    pub async fn send_friend_request(
        &self,
        sender_id: Uuid,
        receiver_id: Uuid,
    ) -> Result<FriendRequestEntity, error::SystemError> {
        if receiver_id == sender_id {
            return Err(error::SystemError::bad_request("Cannot send friend request to yourself"));
        }

        let sender = self.require_user(&sender_id).await?;

        if self.user_repo.find_by_id(&receiver_id).await?.is_none() {
            return Err(error::SystemError::not_found("Receiver user not found"));
        }

        let (friendship, outgoing, incoming) = tokio::try_join!(
            self.friend_repo.find_edge(&sender_id, &receiver_id),
            self.friend_repo.find_request(&receiver_id, &sender_id),
            self.friend_repo.find_request(&sender_id, &receiver_id),
        )?;

        if friendship.is_some() {
            return Err(error::SystemError::bad_request("Users are already friends"));
        }

        if outgoing.is_some() || incoming.is_some() {
            return Err(error::SystemError::bad_request("Friend request already exists"));
        }

        let request =
            self.friend_repo.create_request(&receiver_id, &FriendSnapshot::from(&sender)).await?;

        info!("User {} sent a friend request to {}", sender_id, receiver_id);
        self.publisher.send_to_user(
            receiver_id,
            ServerMessage::FriendRequestReceived {
                from_user_id: sender_id,
                username: request.username.clone(),
            },
        );

        Ok(request)
    }

    pub async fn get_friend_requests(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<FriendRequestResponse>, error::SystemError> {
        let requests = self.friend_repo.find_requests_to(&user_id).await?;
        Ok(requests.into_iter().map(FriendRequestResponse::from).collect())
    }

    pub async fn accept_friend_request(
        &self,
        user_id: Uuid,
        from_user_id: Uuid,
    ) -> Result<FriendResponse, error::SystemError> {
        self.friend_repo
            .find_request(&user_id, &from_user_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Friend request not found"))?;

        let (receiver, sender) =
            tokio::try_join!(self.require_user(&user_id), self.require_user(&from_user_id))?;
        let receiver = FriendSnapshot::from(&receiver);
        let sender = FriendSnapshot::from(&sender);

        let edge = self.friend_repo.accept_friend_request_atomic(&receiver, &sender).await?;

        info!("User {} accepted the friend request from {}", user_id, from_user_id);
        self.publisher.send_to_user(
            from_user_id,
            ServerMessage::FriendRequestAccepted { user_id, username: receiver.username },
        );

        Ok(FriendResponse::from(edge))
    }

    pub async fn reject_friend_request(
        &self,
        user_id: Uuid,
        from_user_id: Uuid,
    ) -> Result<(), error::SystemError> {
        if !self.friend_repo.delete_request(&user_id, &from_user_id).await? {
            return Err(error::SystemError::not_found("Friend request not found"));
        }

        info!("User {} rejected the friend request from {}", user_id, from_user_id);
        Ok(())
    }

    /// Profile fan-out: pushes the owner's new public fields into every mirrored copy.
    pub async fn propagate_profile(
        &self,
        snapshot: &FriendSnapshot,
    ) -> Result<u64, error::SystemError> {
        let copies = self.friend_repo.propagate_profile(snapshot).await?;
        info!("Profile of user {} propagated to {} copies", snapshot.id, copies);
        Ok(copies)
    }

    /// Restores edge symmetry around `user_id`. The caller's own friend list wins:
    /// missing reverse edges are recreated, reverse edges without a matching edge on
    /// the caller's side are removed, and every copy gets the caller's current snapshot.
    pub async fn reconcile(&self, user_id: Uuid) -> Result<ReconcileReport, error::SystemError> {
        let me = FriendSnapshot::from(&self.require_user(&user_id).await?);

        let (own_edges, mirrored) = tokio::try_join!(
            self.friend_repo.find_friends(&user_id),
            self.friend_repo.find_edges_to(&user_id),
        )?;

        let mut report = ReconcileReport::default();
        let own: HashSet<Uuid> = own_edges.iter().map(|edge| edge.friend_id).collect();

        for friend_id in &own {
            if self.friend_repo.upsert_edge(friend_id, &me).await? {
                warn!("Recreated missing edge {} -> {}", friend_id, user_id);
                report.created += 1;
            } else {
                report.refreshed += 1;
            }
        }

        for edge in mirrored.iter().filter(|edge| !own.contains(&edge.owner_id)) {
            if self.friend_repo.delete_edge(&edge.owner_id, &user_id).await? {
                warn!("Removed dangling edge {} -> {}", edge.owner_id, user_id);
                report.removed += 1;
            }
        }

        info!("Reconciled edges of user {}: {:?}", user_id, report);
        Ok(report)
    }
}
