use log::{error as log_error, info};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    api::error,
    modules::{
        activity::{repository::ActivityRepository, service::ActivityService},
        friend::{model::FriendSnapshot, repository::FriendRepo},
        prompt::{
            model::{FeedItem, FeedResponse, LikeResponse},
            repository::PromptRepository,
            schema::{PromptEntity, PromptResponseEntity},
        },
        user::repository::UserRepository,
        websocket::{message::ServerMessage, publisher::EventPublisher},
    },
};

/// Builds the feed out of the latest responses, newest first. `is_new` marks
/// someone else's response posted after `last_checked_at`.
pub fn merge_feed(
    viewer: Uuid,
    responses: Vec<PromptResponseEntity>,
    authors: &HashMap<Uuid, FriendSnapshot>,
    last_checked_at: &chrono::DateTime<chrono::Utc>,
) -> Vec<FeedItem> {
    let mut items: Vec<FeedItem> = responses
        .into_iter()
        .filter_map(|response| {
            let author = authors.get(&response.user_id)?;
            Some(FeedItem {
                response_id: response.id,
                author_id: response.user_id,
                username: author.username.clone(),
                profile_image_url: author.profile_image_url.clone(),
                liked_by_me: response.liked_by.contains(&viewer),
                is_new: response.user_id != viewer && response.created_at > *last_checked_at,
                text: response.text,
                likes: response.likes,
                created_at: response.created_at,
            })
        })
        .collect();

    items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    items
}

#[derive(Clone)]
pub struct PromptService<P, F, U, A>
where
    P: PromptRepository + Send + Sync,
    F: FriendRepo + Send + Sync,
    U: UserRepository + Send + Sync,
    A: ActivityRepository + Send + Sync,
{
    prompt_repo: Arc<P>,
    friend_repo: Arc<F>,
    user_repo: Arc<U>,
    activity: Arc<ActivityService<A, F, P>>,
    publisher: Arc<dyn EventPublisher>,
}

impl<P, F, U, A> PromptService<P, F, U, A>
where
    P: PromptRepository + Send + Sync,
    F: FriendRepo + Send + Sync,
    U: UserRepository + Send + Sync,
    A: ActivityRepository + Send + Sync,
{
    pub fn with_dependencies(
        prompt_repo: Arc<P>,
        friend_repo: Arc<F>,
        user_repo: Arc<U>,
        activity: Arc<ActivityService<A, F, P>>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        PromptService { prompt_repo, friend_repo, user_repo, activity, publisher }
    }

    pub async fn get_current_prompt(&self) -> Result<PromptEntity, error::SystemError> {
        self.prompt_repo
            .find_current_prompt()
            .await?
            .ok_or_else(|| error::SystemError::not_found("No prompt has been published yet"))
    }

    /// Publishes a new prompt. Every feed locks until its owner answers it.
    pub async fn set_current_prompt(&self, text: &str) -> Result<PromptEntity, error::SystemError> {
        let prompt = self.prompt_repo.set_current_prompt(text.trim()).await?;
        let locked = self.user_repo.reset_has_posted_all().await?;

        info!("New prompt published, {} feeds locked", locked);
        Ok(prompt)
    }

    pub async fn post_response(
        &self,
        user_id: Uuid,
        text: &str,
    ) -> Result<PromptResponseEntity, error::SystemError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(error::SystemError::bad_request("Response cannot be empty"));
        }

        let response = self.prompt_repo.create_response(&user_id, text).await?;
        self.user_repo.set_has_posted(&user_id, true).await?;
        info!("User {} answered the prompt ({})", user_id, response.id);

        if let Err(e) = self.activity.notify_response_posted(user_id).await {
            log_error!("Failed to notify friends of user {} about a new post: {}", user_id, e);
        }
        Ok(response)
    }

    pub async fn delete_response(
        &self,
        user_id: Uuid,
        response_id: Uuid,
    ) -> Result<(), error::SystemError> {
        let response = self
            .prompt_repo
            .find_response_by_id(&response_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Response not found"))?;

        if response.user_id != user_id {
            return Err(error::SystemError::forbidden("You can only delete your own responses"));
        }

        self.prompt_repo.delete_response(&response_id).await?;
        if let Err(e) = self.activity.notify_response_deleted(user_id).await {
            log_error!("Failed to rebase like count of user {}: {}", user_id, e);
        }
        Ok(())
    }

    pub async fn get_feed(&self, user_id: Uuid) -> Result<FeedResponse, error::SystemError> {
        let viewer = self
            .user_repo
            .find_by_id(&user_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Could not find uid"))?;

        let prompt = self.prompt_repo.find_current_prompt().await?;

        if !viewer.has_posted {
            return Ok(FeedResponse { prompt, unlocked: false, items: vec![] });
        }

        let (friends, cursor) = tokio::try_join!(
            self.friend_repo.find_friends(&user_id),
            self.activity.cursor(user_id),
        )?;

        let mut authors: HashMap<Uuid, FriendSnapshot> = friends
            .into_iter()
            .map(|edge| {
                (
                    edge.friend_id,
                    FriendSnapshot {
                        id: edge.friend_id,
                        username: edge.username,
                        profile_image_url: edge.profile_image_url,
                    },
                )
            })
            .collect();
        authors.insert(user_id, FriendSnapshot::from(&viewer));

        let ids: Vec<Uuid> = authors.keys().copied().collect();
        let responses = self.prompt_repo.find_latest_responses(&ids).await?;

        let items = merge_feed(user_id, responses, &authors, &cursor.last_checked_at);
        Ok(FeedResponse { prompt, unlocked: true, items })
    }

    pub async fn toggle_like(
        &self,
        user_id: Uuid,
        response_id: Uuid,
    ) -> Result<LikeResponse, error::SystemError> {
        let response = self
            .prompt_repo
            .find_response_by_id(&response_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Response not found"))?;

        let author = response.user_id;
        if author != user_id && self.friend_repo.find_edge(&user_id, &author).await?.is_none() {
            return Err(error::SystemError::forbidden("You can only like responses of friends"));
        }

        let updated = self
            .prompt_repo
            .toggle_like(&response_id, &user_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Response not found"))?;

        let like = LikeResponse::for_viewer(&updated, &user_id);

        if author != user_id {
            if like.liked {
                self.publisher.send_to_user(
                    author,
                    ServerMessage::ResponseLiked {
                        response_id,
                        liked_by: user_id,
                        likes: like.likes,
                    },
                );
            }
            self.activity.notify_like(author).await;
        }

        Ok(like)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::activity::service::ActivityService;
    use crate::modules::prompt::repository::PromptRepository;
    use crate::modules::user::repository::UserRepository;
    use crate::test::{MemoryStore, RecordingPublisher};

    type Svc = PromptService<MemoryStore, MemoryStore, MemoryStore, MemoryStore>;

    fn setup() -> (Arc<MemoryStore>, Arc<RecordingPublisher>, Svc) {
        let store = Arc::new(MemoryStore::default());
        let publisher = Arc::new(RecordingPublisher::default());
        let activity = Arc::new(ActivityService::with_dependencies(
            store.clone(),
            store.clone(),
            store.clone(),
            publisher.clone(),
        ));
        let svc = PromptService::with_dependencies(
            store.clone(),
            store.clone(),
            store.clone(),
            activity,
            publisher.clone(),
        );
        (store, publisher, svc)
    }

    #[tokio::test]
    async fn test_feed_is_locked_until_viewer_posts() {
        let (store, _, svc) = setup();
        let me = store.add_user("me");
        let friend = store.add_user("friend");
        store.befriend(me, friend);
        svc.set_current_prompt("What made you smile today?").await.unwrap();
        svc.post_response(friend, "coffee").await.unwrap();

        let feed = svc.get_feed(me).await.unwrap();
        assert!(!feed.unlocked);
        assert!(feed.items.is_empty());
        assert_eq!(feed.prompt.unwrap().text, "What made you smile today?");

        svc.post_response(me, "sunshine").await.unwrap();
        let feed = svc.get_feed(me).await.unwrap();
        assert!(feed.unlocked);
        assert_eq!(feed.items.len(), 2);
    }

    #[tokio::test]
    async fn test_feed_has_latest_per_author_sorted_desc() {
        let (store, _, svc) = setup();
        let me = store.add_user("me");
        let a = store.add_user("a");
        let b = store.add_user("b");
        let stranger = store.add_user("stranger");
        store.befriend(me, a);
        store.befriend(me, b);

        svc.post_response(a, "a-old").await.unwrap();
        svc.post_response(me, "mine").await.unwrap();
        svc.post_response(b, "b-only").await.unwrap();
        svc.post_response(a, "a-new").await.unwrap();
        svc.post_response(stranger, "hidden").await.unwrap();

        let feed = svc.get_feed(me).await.unwrap();
        let texts: Vec<_> = feed.items.iter().map(|i| i.text.as_str()).collect();
        assert_eq!(texts, vec!["a-new", "b-only", "mine"]);

        let mine = feed.items.iter().find(|i| i.author_id == me).unwrap();
        assert!(!mine.is_new);
        assert!(feed.items.iter().filter(|i| i.author_id != me).all(|i| i.is_new));
        assert_eq!(feed.items[0].username, "a");
    }

    #[tokio::test]
    async fn test_new_prompt_relocks_feed() {
        let (store, _, svc) = setup();
        let me = store.add_user("me");
        svc.post_response(me, "answer").await.unwrap();
        assert!(svc.get_feed(me).await.unwrap().unlocked);

        svc.set_current_prompt("Tomorrow's question").await.unwrap();
        assert!(!svc.get_feed(me).await.unwrap().unlocked);
        assert!(!store.find_by_id(&me).await.unwrap().unwrap().has_posted);
    }

    #[tokio::test]
    async fn test_toggle_like_flips_count_and_membership() {
        let (store, publisher, svc) = setup();
        let me = store.add_user("me");
        let friend = store.add_user("friend");
        store.befriend(me, friend);
        let post = svc.post_response(friend, "like me").await.unwrap();

        let like = svc.toggle_like(me, post.id).await.unwrap();
        assert_eq!(like, LikeResponse { likes: 1, liked: true });
        assert!(matches!(
            publisher.messages_for(friend).iter().find(|m| matches!(m, ServerMessage::ResponseLiked { .. })),
            Some(ServerMessage::ResponseLiked { liked_by, likes: 1, .. }) if *liked_by == me
        ));

        let unlike = svc.toggle_like(me, post.id).await.unwrap();
        assert_eq!(unlike, LikeResponse { likes: 0, liked: false });

        let stored = store.find_response_by_id(&post.id).await.unwrap().unwrap();
        assert!(stored.liked_by.is_empty());
    }

    #[tokio::test]
    async fn test_like_requires_friendship() {
        let (store, _, svc) = setup();
        let me = store.add_user("me");
        let stranger = store.add_user("stranger");
        let post = svc.post_response(stranger, "not for you").await.unwrap();

        let err = svc.toggle_like(me, post.id).await.unwrap_err();
        assert!(matches!(err, error::SystemError::Forbidden(_)));

        let err = svc.toggle_like(me, Uuid::now_v7()).await.unwrap_err();
        assert!(matches!(err, error::SystemError::NotFound(_)));

        // own response is fine
        let mine = svc.post_response(me, "mine").await.unwrap();
        assert!(svc.toggle_like(me, mine.id).await.unwrap().liked);
    }

    #[tokio::test]
    async fn test_post_response_validation_and_delete() {
        let (store, _, svc) = setup();
        let me = store.add_user("me");
        let other = store.add_user("other");

        assert!(matches!(
            svc.post_response(me, "   ").await,
            Err(error::SystemError::BadRequest(_))
        ));

        let post = svc.post_response(me, "  trimmed  ").await.unwrap();
        assert_eq!(post.text, "trimmed");

        let err = svc.delete_response(other, post.id).await.unwrap_err();
        assert!(matches!(err, error::SystemError::Forbidden(_)));

        svc.delete_response(me, post.id).await.unwrap();
        assert!(store.find_response_by_id(&post.id).await.unwrap().is_none());
    }

    /// Cursor store that is down.
    struct UnavailableCursors;

    #[async_trait::async_trait]
    impl ActivityRepository for UnavailableCursors {
        async fn find_cursor(
            &self,
            _: &Uuid,
        ) -> Result<Option<crate::modules::activity::schema::ActivityCursorEntity>, error::SystemError>
        {
            Err(error::SystemError::DatabaseError("cursor store unavailable".into()))
        }

        async fn save_cursor(
            &self,
            _: &crate::modules::activity::schema::ActivityCursorEntity,
        ) -> Result<bool, error::SystemError> {
            Err(error::SystemError::DatabaseError("cursor store unavailable".into()))
        }
    }

    #[tokio::test]
    async fn test_post_survives_notifier_failure() {
        let store = Arc::new(MemoryStore::default());
        let publisher = Arc::new(RecordingPublisher::default());
        let activity = Arc::new(ActivityService::with_dependencies(
            Arc::new(UnavailableCursors),
            store.clone(),
            store.clone(),
            publisher.clone(),
        ));
        let svc = PromptService::with_dependencies(
            store.clone(),
            store.clone(),
            store.clone(),
            activity,
            publisher,
        );
        let me = store.add_user("me");
        let friend = store.add_user("friend");
        store.befriend(me, friend);

        let post = svc.post_response(me, "still saved").await.unwrap();
        assert!(store.find_response_by_id(&post.id).await.unwrap().is_some());
        assert!(store.find_by_id(&me).await.unwrap().unwrap().has_posted);
        assert_eq!(store.find_latest_responses(&[me]).await.unwrap().len(), 1);

        svc.delete_response(me, post.id).await.unwrap();
        assert!(store.find_response_by_id(&post.id).await.unwrap().is_none());
    }

    #[test]
    fn test_merge_feed_skips_unknown_authors() {
        let viewer = Uuid::now_v7();
        let known = Uuid::now_v7();
        let authors = HashMap::from([(
            known,
            FriendSnapshot { id: known, username: "known".into(), profile_image_url: None },
        )]);
        let now = chrono::Utc::now();
        let responses = vec![
            PromptResponseEntity {
                id: Uuid::now_v7(),
                user_id: known,
                text: "hi".into(),
                likes: 1,
                liked_by: vec![viewer],
                created_at: now,
            },
            PromptResponseEntity {
                id: Uuid::now_v7(),
                user_id: Uuid::now_v7(),
                text: "who".into(),
                likes: 0,
                liked_by: vec![],
                created_at: now,
            },
        ];

        let items = merge_feed(viewer, responses, &authors, &(now - chrono::Duration::minutes(1)));
        assert_eq!(items.len(), 1);
        assert!(items[0].liked_by_me);
        assert!(items[0].is_new);
    }
}
