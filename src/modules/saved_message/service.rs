use chrono::NaiveDate;
use log::info;
use std::collections::BTreeSet;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    api::error,
    modules::{
        friend::repository::FriendRepo,
        saved_message::{
            model::{SaveMessageModel, day_bounds, month_bounds},
            repository::SavedMessageRepository,
            schema::SavedMessageEntity,
        },
    },
};

#[derive(Clone)]
pub struct SavedMessageService<S, F>
where
    S: SavedMessageRepository + Send + Sync,
    F: FriendRepo + Send + Sync,
{
    saved_repo: Arc<S>,
    friend_repo: Arc<F>,
}

impl<S, F> SavedMessageService<S, F>
where
    S: SavedMessageRepository + Send + Sync,
    F: FriendRepo + Send + Sync,
{
    pub fn with_dependencies(saved_repo: Arc<S>, friend_repo: Arc<F>) -> Self {
        SavedMessageService { saved_repo, friend_repo }
    }

    pub async fn save(
        &self,
        user_id: Uuid,
        message: SaveMessageModel,
    ) -> Result<SavedMessageEntity, error::SystemError> {
        if self.friend_repo.find_edge(&user_id, &message.to_user_id).await?.is_none() {
            return Err(error::SystemError::forbidden("You can only save messages with friends"));
        }

        let entity = SavedMessageEntity {
            id: message.message_id,
            from_user_id: user_id,
            to_user_id: message.to_user_id,
            content: message.content,
            sent_at: message.sent_at,
            saved_at: chrono::Utc::now(),
        };

        let saved = self.saved_repo.create(&entity).await?;
        info!("User {} saved message {}", user_id, saved.id);
        Ok(saved)
    }

    pub async fn list_for_day(
        &self,
        user_id: Uuid,
        other_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<SavedMessageEntity>, error::SystemError> {
        let (from, to) = day_bounds(date)?;
        self.saved_repo.find_between(&user_id, &other_id, &from, &to).await
    }

    /// Days of `month` that hold at least one saved message, ascending.
    pub async fn list_days(
        &self,
        user_id: Uuid,
        other_id: Uuid,
        month: &str,
    ) -> Result<Vec<NaiveDate>, error::SystemError> {
        let (from, to) = month_bounds(month)?;
        let messages = self.saved_repo.find_between(&user_id, &other_id, &from, &to).await?;

        let days: BTreeSet<NaiveDate> =
            messages.iter().map(|message| message.sent_at.date_naive()).collect();
        Ok(days.into_iter().collect())
    }

    pub async fn delete(&self, user_id: Uuid, message_id: Uuid) -> Result<(), error::SystemError> {
        let message = self
            .saved_repo
            .find_by_id(&message_id)
            .await?
            .filter(|message| message.involves(&user_id))
            .ok_or_else(|| error::SystemError::not_found("Saved message not found"))?;

        self.saved_repo.delete(&message.id).await?;
        Ok(())
    }
}
