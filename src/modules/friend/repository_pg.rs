use uuid::Uuid;

use crate::{
    api::error,
    configs::Store,
    modules::friend::{
        repository::{FriendRepo, FriendRepository, FriendRequestRepository, check_acceptable},
        schema::{FriendRequestEntity, FriendshipEntity, ordered_pair},
    },
};

#[derive(Clone)]
pub struct FriendRepositoryPg {
    store: Store,
}

impl FriendRepositoryPg {
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait::async_trait]
impl FriendRepository for FriendRepositoryPg {
    async fn find_friendship(
        &self,
        user_id_a: &Uuid,
        user_id_b: &Uuid,
    ) -> Result<Option<FriendshipEntity>, error::SystemError> {
        let (user_a, user_b) = ordered_pair(*user_id_a, *user_id_b);

        let friendship = sqlx::query_as::<_, FriendshipEntity>(
            "SELECT * FROM friendships WHERE user_a = $1 AND user_b = $2",
        )
        .bind(user_a)
        .bind(user_b)
        .fetch_optional(self.store.pool()?)
        .await?;

        Ok(friendship)
    }

    async fn find_friend_ids(&self, user_id: &Uuid) -> Result<Vec<Uuid>, error::SystemError> {
        let friendships = sqlx::query_as::<_, FriendshipEntity>(
            r#"
            SELECT *
            FROM friendships
            WHERE user_a = $1
               OR user_b = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(self.store.pool()?)
        .await?;

        Ok(friendships.iter().map(|f| f.other(user_id)).collect())
    }

    async fn delete_friendship(
        &self,
        user_id_a: &Uuid,
        user_id_b: &Uuid,
    ) -> Result<bool, error::SystemError> {
        let (user_a, user_b) = ordered_pair(*user_id_a, *user_id_b);

        let rows = sqlx::query("DELETE FROM friendships WHERE user_a = $1 AND user_b = $2")
            .bind(user_a)
            .bind(user_b)
            .execute(self.store.pool()?)
            .await?
            .rows_affected();

        Ok(rows > 0)
    }
}

#[async_trait::async_trait]
impl FriendRequestRepository for FriendRepositoryPg {
    async fn find_pending_request(
        &self,
        sender_id: &Uuid,
        receiver_email: &str,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError> {
        let request = sqlx::query_as::<_, FriendRequestEntity>(
            r#"
            SELECT *
            FROM friend_requests
            WHERE sender_id = $1
              AND receiver_email = lower($2)
              AND status = 'pending'
            "#,
        )
        .bind(sender_id)
        .bind(receiver_email)
        .fetch_optional(self.store.pool()?)
        .await?;

        Ok(request)
    }

    async fn find_friend_request_by_id(
        &self,
        request_id: &Uuid,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError> {
        let request =
            sqlx::query_as::<_, FriendRequestEntity>("SELECT * FROM friend_requests WHERE id = $1")
                .bind(request_id)
                .fetch_optional(self.store.pool()?)
                .await?;

        Ok(request)
    }

    async fn find_pending_to_email(
        &self,
        receiver_email: &str,
    ) -> Result<Vec<FriendRequestEntity>, error::SystemError> {
        let requests = sqlx::query_as::<_, FriendRequestEntity>(
            r#"
            SELECT *
            FROM friend_requests
            WHERE receiver_email = lower($1)
              AND status = 'pending'
            ORDER BY created_at DESC
            "#,
        )
        .bind(receiver_email)
        .fetch_all(self.store.pool()?)
        .await?;

        Ok(requests)
    }

    async fn find_pending_from_user(
        &self,
        sender_id: &Uuid,
    ) -> Result<Vec<FriendRequestEntity>, error::SystemError> {
        let requests = sqlx::query_as::<_, FriendRequestEntity>(
            r#"
            SELECT *
            FROM friend_requests
            WHERE sender_id = $1
              AND status = 'pending'
            ORDER BY created_at DESC
            "#,
        )
        .bind(sender_id)
        .fetch_all(self.store.pool()?)
        .await?;

        Ok(requests)
    }

    async fn create_friend_request(
        &self,
        sender_id: &Uuid,
        receiver_email: &str,
    ) -> Result<FriendRequestEntity, error::SystemError> {
        let id = Uuid::new_v7(uuid::Timestamp::now(uuid::NoContext));
        let request = sqlx::query_as::<_, FriendRequestEntity>(
            r#"
            INSERT INTO friend_requests (id, sender_id, receiver_email, status)
            VALUES ($1, $2, lower($3), 'pending')
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(sender_id)
        .bind(receiver_email)
        .fetch_one(self.store.pool()?)
        .await?;

        Ok(request)
    }

    async fn reject_friend_request(
        &self,
        request_id: &Uuid,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError> {
        let request = sqlx::query_as::<_, FriendRequestEntity>(
            r#"
            UPDATE friend_requests
            SET status = 'rejected', resolved_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(request_id)
        .fetch_optional(self.store.pool()?)
        .await?;

        Ok(request)
    }

    async fn delete_pending_request(&self, request_id: &Uuid) -> Result<bool, error::SystemError> {
        let rows =
            sqlx::query("DELETE FROM friend_requests WHERE id = $1 AND status = 'pending'")
                .bind(request_id)
                .execute(self.store.pool()?)
                .await?
                .rows_affected();

        Ok(rows > 0)
    }
}

#[async_trait::async_trait]
impl FriendRepo for FriendRepositoryPg {
    async fn accept_friend_request_atomic(
        &self,
        request_id: &Uuid,
        user_id: &Uuid,
        user_email: &str,
    ) -> Result<FriendRequestEntity, error::SystemError> {
        let mut tx = self.store.pool()?.begin().await?;

        let request = sqlx::query_as::<_, FriendRequestEntity>(
            "SELECT * FROM friend_requests WHERE id = $1 FOR UPDATE",
        )
        .bind(request_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| error::SystemError::not_found("Friend request not found"))?;

        if let Err(e) = check_acceptable(&request, user_id, user_email) {
            tx.rollback().await?;
            return Err(e);
        }

        let accepted = sqlx::query_as::<_, FriendRequestEntity>(
            r#"
            UPDATE friend_requests
            SET status = 'accepted', resolved_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(request_id)
        .fetch_one(&mut *tx)
        .await?;

        let (u1, u2) = ordered_pair(request.sender_id, *user_id);

        sqlx::query(
            "INSERT INTO friendships (user_a, user_b) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(u1)
        .bind(u2)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(accepted)
    }
}
