use futures_util::future::join_all;
use log::{debug, error as log_error, info};
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    api::error,
    modules::{
        activity::{
            model::ActivityBadgeResponse, repository::ActivityRepository,
            schema::ActivityCursorEntity,
        },
        friend::repository::FriendRepo,
        prompt::repository::PromptRepository,
        websocket::{message::ServerMessage, publisher::EventPublisher},
    },
};

const CURSOR_WRITE_ATTEMPTS: usize = 5;

/// Unseen-activity notifier. Keeps each user's read cursor and pushes the badge
/// whenever something it depends on changes.
#[derive(Clone)]
pub struct ActivityService<A, F, P>
where
    A: ActivityRepository + Send + Sync,
    F: FriendRepo + Send + Sync,
    P: PromptRepository + Send + Sync,
{
    activity_repo: Arc<A>,
    friend_repo: Arc<F>,
    prompt_repo: Arc<P>,
    publisher: Arc<dyn EventPublisher>,
}

impl<A, F, P> ActivityService<A, F, P>
where
    A: ActivityRepository + Send + Sync,
    F: FriendRepo + Send + Sync,
    P: PromptRepository + Send + Sync,
{
    pub fn with_dependencies(
        activity_repo: Arc<A>,
        friend_repo: Arc<F>,
        prompt_repo: Arc<P>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        ActivityService { activity_repo, friend_repo, prompt_repo, publisher }
    }

    pub async fn cursor(&self, user_id: Uuid) -> Result<ActivityCursorEntity, error::SystemError> {
        Ok(self
            .activity_repo
            .find_cursor(&user_id)
            .await?
            .unwrap_or_else(|| ActivityCursorEntity::fresh(user_id)))
    }

    async fn own_latest_likes(&self, user_id: Uuid) -> Result<Option<i32>, error::SystemError> {
        let own_ids = [user_id];
        let latest = self.prompt_repo.find_latest_responses(&own_ids).await?;
        Ok(latest.into_iter().find(|r| r.user_id == user_id).map(|r| r.likes))
    }

    /// Re-reads everything the badge depends on and folds it into the cursor.
    /// The write only lands on the version it was computed from; otherwise it starts over.
    pub async fn evaluate(
        &self,
        user_id: Uuid,
    ) -> Result<ActivityBadgeResponse, error::SystemError> {
        for _ in 0..CURSOR_WRITE_ATTEMPTS {
            let (mut cursor, friend_ids) = tokio::try_join!(
                self.cursor(user_id),
                self.friend_repo.find_friend_ids(&user_id),
            )?;

            let own_ids = [user_id];
            let (recent, own_latest) = tokio::try_join!(
                self.prompt_repo.find_responses_since(&friend_ids, &cursor.last_checked_at),
                self.prompt_repo.find_latest_responses(&own_ids),
            )?;

            let friend_ids: HashSet<Uuid> = friend_ids.into_iter().collect();
            let own_latest = own_latest.iter().find(|r| r.user_id == user_id);

            if !cursor.observe(&friend_ids, &recent, own_latest) {
                return Ok(ActivityBadgeResponse::from(&cursor));
            }

            if self.activity_repo.save_cursor(&cursor).await? {
                debug!("Activity cursor of user {} updated: unseen={}", user_id, cursor.has_unseen);
                return Ok(ActivityBadgeResponse::from(&cursor));
            }
            debug!("Activity cursor of user {} moved underneath, re-evaluating", user_id);
        }

        Err(cursor_contended(user_id))
    }

    /// The feed was opened: everything up to now is seen.
    pub async fn mark_seen(
        &self,
        user_id: Uuid,
    ) -> Result<ActivityBadgeResponse, error::SystemError> {
        for _ in 0..CURSOR_WRITE_ATTEMPTS {
            let (mut cursor, own_likes) =
                tokio::try_join!(self.cursor(user_id), self.own_latest_likes(user_id))?;

            cursor.mark_seen(chrono::Utc::now(), own_likes);
            if self.activity_repo.save_cursor(&cursor).await? {
                self.publisher
                    .send_to_user(user_id, ServerMessage::ActivityBadge { has_unseen: false });
                return Ok(ActivityBadgeResponse::from(&cursor));
            }
        }

        Err(cursor_contended(user_id))
    }

    /// Moves the remembered like count to `likes` without touching the badge.
    async fn set_like_baseline(&self, user_id: Uuid, likes: i32) -> Result<(), error::SystemError> {
        for _ in 0..CURSOR_WRITE_ATTEMPTS {
            let mut cursor = self.cursor(user_id).await?;
            if cursor.last_likes_count == likes {
                return Ok(());
            }

            cursor.last_likes_count = likes;
            cursor.updated_at = chrono::Utc::now();
            if self.activity_repo.save_cursor(&cursor).await? {
                return Ok(());
            }
        }

        Err(cursor_contended(user_id))
    }

    async fn evaluate_and_push(&self, user_id: Uuid) {
        match self.evaluate(user_id).await {
            Ok(badge) => self.publisher.send_to_user(
                user_id,
                ServerMessage::ActivityBadge { has_unseen: badge.has_unseen },
            ),
            Err(e) => log_error!("Failed to evaluate activity of user {}: {}", user_id, e),
        }
    }

    /// `author` just posted: their like count starts over, and everyone who lists
    /// them as a friend gets re-evaluated.
    pub async fn notify_response_posted(&self, author: Uuid) -> Result<(), error::SystemError> {
        self.set_like_baseline(author, 0).await?;

        let viewers: Vec<Uuid> = self
            .friend_repo
            .find_edges_to(&author)
            .await?
            .into_iter()
            .map(|edge| edge.owner_id)
            .collect();

        let badges = join_all(
            viewers.iter().map(|viewer| async move { (*viewer, self.evaluate(*viewer).await) }),
        )
        .await;

        let (mut lit, mut clear) = (Vec::new(), Vec::new());
        for (viewer, badge) in badges {
            match badge {
                Ok(badge) if badge.has_unseen => lit.push(viewer),
                Ok(_) => clear.push(viewer),
                Err(e) => log_error!("Failed to evaluate activity of user {}: {}", viewer, e),
            }
        }
        self.publisher.send_to_users(lit, ServerMessage::ActivityBadge { has_unseen: true });
        self.publisher.send_to_users(clear, ServerMessage::ActivityBadge { has_unseen: false });

        info!("Activity of {} friends re-evaluated after a post by {}", viewers.len(), author);
        Ok(())
    }

    /// `author` removed a response: the baseline follows whichever response is latest now,
    /// so likes it already had are not reported as new.
    pub async fn notify_response_deleted(&self, author: Uuid) -> Result<(), error::SystemError> {
        let likes = self.own_latest_likes(author).await?.unwrap_or(0);
        self.set_like_baseline(author, likes).await
    }

    pub async fn notify_like(&self, author: Uuid) {
        self.evaluate_and_push(author).await;
    }
}

fn cursor_contended(user_id: Uuid) -> error::SystemError {
    log_error!("Activity cursor of user {} kept changing, giving up", user_id);
    error::SystemError::conflict("Activity changed concurrently, try again")
}
