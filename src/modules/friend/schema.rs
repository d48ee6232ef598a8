use serde::{Deserialize, Serialize};
use sqlx::prelude::{FromRow, Type};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(type_name = "friend_request_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FriendRequestStatus {
    Pending,
    Accepted,
    Rejected,
}

/// One row per unordered pair, stored with `user_a < user_b`.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FriendshipEntity {
    pub user_a: Uuid,
    pub user_b: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl FriendshipEntity {
    pub fn other(&self, user_id: &Uuid) -> Uuid {
        if self.user_a == *user_id { self.user_b } else { self.user_a }
    }
}

pub fn ordered_pair(a: Uuid, b: Uuid) -> (Uuid, Uuid) {
    if a <= b { (a, b) } else { (b, a) }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FriendRequestEntity {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_email: String,
    pub status: FriendRequestStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub resolved_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl FriendRequestEntity {
    pub fn is_pending(&self) -> bool {
        self.status == FriendRequestStatus::Pending
    }

    pub fn is_addressed_to(&self, email: &str) -> bool {
        self.receiver_email.eq_ignore_ascii_case(email.trim())
    }
}
