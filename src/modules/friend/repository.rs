use uuid::Uuid;

use crate::api::error;
use crate::modules::friend::schema::{FriendRequestEntity, FriendshipEntity};

#[async_trait::async_trait]
pub trait FriendRepository {
    async fn find_friendship(
        &self,
        user_id_a: &Uuid,
        user_id_b: &Uuid,
    ) -> Result<Option<FriendshipEntity>, error::SystemError>;

    /// Ids of everyone `user_id` is friends with, from either side of the pair.
    async fn find_friend_ids(&self, user_id: &Uuid) -> Result<Vec<Uuid>, error::SystemError>;

    async fn delete_friendship(
        &self,
        user_id_a: &Uuid,
        user_id_b: &Uuid,
    ) -> Result<bool, error::SystemError>;
}

#[async_trait::async_trait]
pub trait FriendRequestRepository {
    async fn find_pending_request(
        &self,
        sender_id: &Uuid,
        receiver_email: &str,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError>;

    async fn find_friend_request_by_id(
        &self,
        request_id: &Uuid,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError>;

    async fn find_pending_to_email(
        &self,
        receiver_email: &str,
    ) -> Result<Vec<FriendRequestEntity>, error::SystemError>;

    async fn find_pending_from_user(
        &self,
        sender_id: &Uuid,
    ) -> Result<Vec<FriendRequestEntity>, error::SystemError>;

    async fn create_friend_request(
        &self,
        sender_id: &Uuid,
        receiver_email: &str,
    ) -> Result<FriendRequestEntity, error::SystemError>;

    /// Moves a pending request to rejected. `None` when it was no longer pending.
    async fn reject_friend_request(
        &self,
        request_id: &Uuid,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError>;

    async fn delete_pending_request(&self, request_id: &Uuid) -> Result<bool, error::SystemError>;
}

#[async_trait::async_trait]
pub trait FriendRepo: FriendRepository + FriendRequestRepository + Send + Sync {
    /// Marks the request accepted and creates the friendship as one unit.
    /// Either both changes are visible afterwards or neither is.
    async fn accept_friend_request_atomic(
        &self,
        request_id: &Uuid,
        user_id: &Uuid,
        user_email: &str,
    ) -> Result<FriendRequestEntity, error::SystemError>;
}

/// Checks shared by every accept implementation, run against the locked row.
pub fn check_acceptable(
    request: &FriendRequestEntity,
    user_id: &Uuid,
    user_email: &str,
) -> Result<(), error::SystemError> {
    if !request.is_addressed_to(user_email) {
        return Err(error::SystemError::forbidden(
            "You are not allowed to accept this friend request",
        ));
    }

    if !request.is_pending() {
        return Err(error::SystemError::conflict("Friend request has already been resolved"));
    }

    if request.sender_id == *user_id {
        return Err(error::SystemError::bad_request("Cannot accept your own friend request"));
    }

    Ok(())
}
