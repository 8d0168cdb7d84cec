use serde::Serialize;
use sqlx::prelude::FromRow;
use std::collections::HashSet;
use uuid::Uuid;

use crate::modules::prompt::schema::PromptResponseEntity;

/// Per-user read cursor behind the unseen-activity badge.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct ActivityCursorEntity {
    pub user_id: Uuid,
    pub last_checked_at: chrono::DateTime<chrono::Utc>,
    pub last_likes_count: i32,
    pub has_unseen: bool,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    /// Bumped on every stored write; 0 means never stored.
    pub version: i64,
}

impl ActivityCursorEntity {
    /// Cursor of a user that never opened the feed: everything is newer than it.
    pub fn fresh(user_id: Uuid) -> Self {
        ActivityCursorEntity {
            user_id,
            last_checked_at: chrono::DateTime::<chrono::Utc>::default(),
            last_likes_count: 0,
            has_unseen: false,
            updated_at: chrono::Utc::now(),
            version: 0,
        }
    }

    /// Folds freshly observed responses into the cursor and returns whether it changed.
    ///
    /// Friend activity is any response newer than `last_checked_at` whose author is in
    /// `friend_ids` and is not the owner. A new like is the owner's latest response
    /// carrying more likes than remembered; the remembered count follows it up.
    /// The badge is sticky: only [`Self::mark_seen`] clears it.
    pub fn observe(
        &mut self,
        friend_ids: &HashSet<Uuid>,
        recent: &[PromptResponseEntity],
        own_latest: Option<&PromptResponseEntity>,
    ) -> bool {
        let before = (self.has_unseen, self.last_likes_count);

        let friend_activity = recent.iter().any(|response| {
            response.user_id != self.user_id
                && friend_ids.contains(&response.user_id)
                && response.created_at > self.last_checked_at
        });

        let new_likes = own_latest
            .filter(|response| response.user_id == self.user_id)
            .map(|response| response.likes)
            .filter(|likes| *likes > self.last_likes_count);

        if let Some(likes) = new_likes {
            self.last_likes_count = likes;
        }

        self.has_unseen = self.has_unseen || friend_activity || new_likes.is_some();

        let changed = before != (self.has_unseen, self.last_likes_count);
        if changed {
            self.updated_at = chrono::Utc::now();
        }
        changed
    }

    /// Everything up to `now` counts as seen.
    pub fn mark_seen(&mut self, now: chrono::DateTime<chrono::Utc>, own_likes: Option<i32>) {
        self.last_checked_at = now;
        self.has_unseen = false;
        if let Some(likes) = own_likes {
            self.last_likes_count = likes;
        }
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn response(user_id: Uuid, likes: i32, created_at: chrono::DateTime<Utc>) -> PromptResponseEntity {
        PromptResponseEntity {
            id: Uuid::now_v7(),
            user_id,
            text: "answer".into(),
            likes,
            liked_by: vec![],
            created_at,
        }
    }

    #[test]
    fn test_friend_post_after_cursor_lights_badge() {
        let me = Uuid::now_v7();
        let friend = Uuid::now_v7();
        let mut cursor = ActivityCursorEntity::fresh(me);
        cursor.last_checked_at = Utc::now() - Duration::hours(1);

        let friends = HashSet::from([friend]);
        let recent = [response(friend, 0, Utc::now())];

        assert!(cursor.observe(&friends, &recent, None));
        assert!(cursor.has_unseen);
    }

    #[test]
    fn test_non_friend_self_and_old_posts_are_ignored() {
        let me = Uuid::now_v7();
        let friend = Uuid::now_v7();
        let stranger = Uuid::now_v7();
        let checked = Utc::now() - Duration::hours(1);
        let mut cursor = ActivityCursorEntity::fresh(me);
        cursor.last_checked_at = checked;

        let friends = HashSet::from([friend, me]);
        let recent = [
            response(stranger, 0, Utc::now()),
            response(me, 0, Utc::now()),
            response(friend, 0, checked - Duration::minutes(5)),
        ];

        assert!(!cursor.observe(&friends, &recent, None));
        assert!(!cursor.has_unseen);
    }

    #[test]
    fn test_new_like_raises_remembered_count() {
        let me = Uuid::now_v7();
        let mut cursor = ActivityCursorEntity::fresh(me);
        cursor.last_likes_count = 2;

        let own = response(me, 2, Utc::now());
        assert!(!cursor.observe(&HashSet::new(), &[], Some(&own)));

        let own = response(me, 3, Utc::now());
        assert!(cursor.observe(&HashSet::new(), &[], Some(&own)));
        assert!(cursor.has_unseen);
        assert_eq!(cursor.last_likes_count, 3);
    }

    #[test]
    fn test_badge_is_sticky_until_seen() {
        let me = Uuid::now_v7();
        let mut cursor = ActivityCursorEntity::fresh(me);
        let own = response(me, 1, Utc::now());
        cursor.observe(&HashSet::new(), &[], Some(&own));
        assert!(cursor.has_unseen);

        // nothing new, still lit
        assert!(!cursor.observe(&HashSet::new(), &[], Some(&own)));
        assert!(cursor.has_unseen);

        let now = Utc::now();
        cursor.mark_seen(now, Some(1));
        assert!(!cursor.has_unseen);
        assert_eq!(cursor.last_checked_at, now);
        assert!(!cursor.observe(&HashSet::new(), &[], Some(&own)));
    }
}
