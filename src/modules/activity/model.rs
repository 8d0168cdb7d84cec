use serde::Serialize;

use crate::modules::activity::schema::ActivityCursorEntity;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityBadgeResponse {
    pub has_unseen: bool,
    pub last_checked_at: chrono::DateTime<chrono::Utc>,
}

impl From<&ActivityCursorEntity> for ActivityBadgeResponse {
    fn from(cursor: &ActivityCursorEntity) -> Self {
        ActivityBadgeResponse {
            has_unseen: cursor.has_unseen,
            last_checked_at: cursor.last_checked_at,
        }
    }
}
