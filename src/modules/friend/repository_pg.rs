use uuid::Uuid;

use crate::{
    api::error,
    modules::friend::{
        model::{FriendSnapshot, UpdateFriendFlags},
        repository::{FriendRepo, FriendRepository, FriendRequestRepository},
        schema::{FriendEdgeEntity, FriendRequestEntity},
    },
};

#[derive(Clone)]
pub struct FriendRepositoryPg {
    pool: sqlx::PgPool,
}

impl FriendRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

const INSERT_EDGE: &str = r#"
    INSERT INTO friend_edges (owner_id, friend_id, username, profile_image_url)
    VALUES ($1, $2, $3, $4)
    ON CONFLICT (owner_id, friend_id) DO UPDATE
    SET username = EXCLUDED.username,
        profile_image_url = EXCLUDED.profile_image_url
    RETURNING *
"#;

#[async_trait::async_trait]
impl FriendRepository for FriendRepositoryPg {
    async fn find_edge(
        &self,
        owner_id: &Uuid,
        friend_id: &Uuid,
    ) -> Result<Option<FriendEdgeEntity>, error::SystemError> {
        let edge = sqlx::query_as::<_, FriendEdgeEntity>(
            "SELECT * FROM friend_edges WHERE owner_id = $1 AND friend_id = $2",
        )
        .bind(owner_id)
        .bind(friend_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(edge)
    }

    async fn find_friends(
        &self,
        owner_id: &Uuid,
    ) -> Result<Vec<FriendEdgeEntity>, error::SystemError> {
        let friends = sqlx::query_as::<_, FriendEdgeEntity>(
            r#"
            SELECT *
            FROM friend_edges
            WHERE owner_id = $1
            ORDER BY is_pinned DESC, lower(username)
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(friends)
    }

    async fn find_friend_ids(&self, owner_id: &Uuid) -> Result<Vec<Uuid>, error::SystemError> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT friend_id FROM friend_edges WHERE owner_id = $1",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    async fn find_edges_to(
        &self,
        friend_id: &Uuid,
    ) -> Result<Vec<FriendEdgeEntity>, error::SystemError> {
        let edges = sqlx::query_as::<_, FriendEdgeEntity>(
            "SELECT * FROM friend_edges WHERE friend_id = $1",
        )
        .bind(friend_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(edges)
    }

    async fn upsert_edge(
        &self,
        owner_id: &Uuid,
        friend: &FriendSnapshot,
    ) -> Result<bool, error::SystemError> {
        let inserted = sqlx::query_scalar::<_, bool>(
            r#"
            INSERT INTO friend_edges (owner_id, friend_id, username, profile_image_url)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (owner_id, friend_id) DO UPDATE
            SET username = EXCLUDED.username,
                profile_image_url = EXCLUDED.profile_image_url
            RETURNING (xmax = 0)
            "#,
        )
        .bind(owner_id)
        .bind(friend.id)
        .bind(&friend.username)
        .bind(&friend.profile_image_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(inserted)
    }

    async fn delete_edge(
        &self,
        owner_id: &Uuid,
        friend_id: &Uuid,
    ) -> Result<bool, error::SystemError> {
        let rows = sqlx::query("DELETE FROM friend_edges WHERE owner_id = $1 AND friend_id = $2")
            .bind(owner_id)
            .bind(friend_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows > 0)
    }

    async fn delete_friendship(
        &self,
        user_id_a: &Uuid,
        user_id_b: &Uuid,
    ) -> Result<bool, error::SystemError> {
        let rows = sqlx::query(
            r#"
            DELETE FROM friend_edges
            WHERE (owner_id = $1 AND friend_id = $2)
               OR (owner_id = $2 AND friend_id = $1)
            "#,
        )
        .bind(user_id_a)
        .bind(user_id_b)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(rows > 0)
    }

    async fn update_flags(
        &self,
        owner_id: &Uuid,
        friend_id: &Uuid,
        flags: &UpdateFriendFlags,
    ) -> Result<Option<FriendEdgeEntity>, error::SystemError> {
        let edge = sqlx::query_as::<_, FriendEdgeEntity>(
            r#"
            UPDATE friend_edges
            SET
                is_pinned = COALESCE($3, is_pinned),
                is_muted  = COALESCE($4, is_muted)
            WHERE owner_id = $1 AND friend_id = $2
            RETURNING *
            "#,
        )
        .bind(owner_id)
        .bind(friend_id)
        .bind(flags.is_pinned)
        .bind(flags.is_muted)
        .fetch_optional(&self.pool)
        .await?;

        Ok(edge)
    }

    async fn propagate_profile(
        &self,
        snapshot: &FriendSnapshot,
    ) -> Result<u64, error::SystemError> {
        let mut tx = self.pool.begin().await?;

        let edges = sqlx::query(
            "UPDATE friend_edges SET username = $2, profile_image_url = $3 WHERE friend_id = $1",
        )
        .bind(snapshot.id)
        .bind(&snapshot.username)
        .bind(&snapshot.profile_image_url)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let requests = sqlx::query(
            "UPDATE friend_requests SET username = $2, profile_image_url = $3 WHERE from_user_id = $1",
        )
        .bind(snapshot.id)
        .bind(&snapshot.username)
        .bind(&snapshot.profile_image_url)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        tx.commit().await?;

        Ok(edges + requests)
    }
}

#[async_trait::async_trait]
impl FriendRequestRepository for FriendRepositoryPg {
    async fn find_request(
        &self,
        to_user_id: &Uuid,
        from_user_id: &Uuid,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError> {
        let request = sqlx::query_as::<_, FriendRequestEntity>(
            "SELECT * FROM friend_requests WHERE to_user_id = $1 AND from_user_id = $2",
        )
        .bind(to_user_id)
        .bind(from_user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    async fn find_requests_to(
        &self,
        to_user_id: &Uuid,
    ) -> Result<Vec<FriendRequestEntity>, error::SystemError> {
        let requests = sqlx::query_as::<_, FriendRequestEntity>(
            "SELECT * FROM friend_requests WHERE to_user_id = $1 ORDER BY created_at DESC",
        )
        .bind(to_user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }

    async fn create_request(
        &self,
        to_user_id: &Uuid,
        sender: &FriendSnapshot,
    ) -> Result<FriendRequestEntity, error::SystemError> {
        let request = sqlx::query_as::<_, FriendRequestEntity>(
            r#"
            INSERT INTO friend_requests (to_user_id, from_user_id, username, profile_image_url)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(to_user_id)
        .bind(sender.id)
        .bind(&sender.username)
        .bind(&sender.profile_image_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(request)
    }

    async fn delete_request(
        &self,
        to_user_id: &Uuid,
        from_user_id: &Uuid,
    ) -> Result<bool, error::SystemError> {
        let rows =
            sqlx::query("DELETE FROM friend_requests WHERE to_user_id = $1 AND from_user_id = $2")
                .bind(to_user_id)
                .bind(from_user_id)
                .execute(&self.pool)
                .await?
                .rows_affected();

        Ok(rows > 0)
    }
}

#[async_trait::async_trait]
impl FriendRepo for FriendRepositoryPg {
    async fn accept_friend_request_atomic(
        &self,
        receiver: &FriendSnapshot,
        sender: &FriendSnapshot,
    ) -> Result<FriendEdgeEntity, error::SystemError> {
        let mut tx = self.pool.begin().await?;

        let consumed = sqlx::query(
            "DELETE FROM friend_requests WHERE to_user_id = $1 AND from_user_id = $2",
        )
        .bind(receiver.id)
        .bind(sender.id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if consumed == 0 {
            tx.rollback().await?;
            return Err(error::SystemError::not_found("Friend request not found"));
        }

        let receiver_edge = sqlx::query_as::<_, FriendEdgeEntity>(INSERT_EDGE)
            .bind(receiver.id)
            .bind(sender.id)
            .bind(&sender.username)
            .bind(&sender.profile_image_url)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query(INSERT_EDGE)
            .bind(sender.id)
            .bind(receiver.id)
            .bind(&receiver.username)
            .bind(&receiver.profile_image_url)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(receiver_edge)
    }
}
