use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::modules::{
    friend::schema::{FriendRequestEntity, FriendRequestStatus},
    media::schema::{MediaEntryEntity, MediaStatus, MediaType},
    profile::schema::ProfileEntity,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FriendResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub avatar: Option<String>,
}

impl From<ProfileEntity> for FriendResponse {
    fn from(profile: ProfileEntity) -> Self {
        FriendResponse {
            id: profile.id,
            email: profile.email,
            name: profile.display_name,
            avatar: profile.avatar_url,
        }
    }
}

impl FriendResponse {
    /// Placeholder for a friend who never registered a profile.
    pub fn unknown(id: Uuid) -> Self {
        FriendResponse { id, email: "unknown".into(), name: "Friend User".into(), avatar: None }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FriendRequestResponse {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub sender_email: String,
    pub sender_name: String,
    pub sender_avatar: Option<String>,
    pub receiver_email: String,
    pub status: FriendRequestStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl FriendRequestResponse {
    pub fn new(request: FriendRequestEntity, sender: Option<&ProfileEntity>) -> Self {
        let (sender_email, sender_name, sender_avatar) = match sender {
            Some(p) => (p.email.clone(), p.display_name.clone(), p.avatar_url.clone()),
            None => ("Unknown".to_string(), "Unknown User".to_string(), None),
        };

        FriendRequestResponse {
            id: request.id,
            sender_id: request.sender_id,
            sender_email,
            sender_name,
            sender_avatar,
            receiver_email: request.receiver_email,
            status: request.status,
            created_at: request.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct FriendRequestBody {
    #[serde(deserialize_with = "crate::utils::trimmed")]
    #[validate(email(message = "Invalid email format"))]
    pub receiver_email: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    Completed,
    Rated,
    Reviewed,
    Saved,
}

impl ActivityAction {
    /// Label precedence: consumed, then rated, then non-empty notes.
    pub fn of(entry: &MediaEntryEntity) -> Self {
        if entry.status == MediaStatus::Consumed {
            ActivityAction::Completed
        } else if entry.rating > 0 {
            ActivityAction::Rated
        } else if entry.has_notes() {
            ActivityAction::Reviewed
        } else {
            ActivityAction::Saved
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityItem {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_name: String,
    pub user_avatar: Option<String>,
    pub action: ActivityAction,
    pub media_title: String,
    pub media_type: MediaType,
    pub rating: i16,
    pub review: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Projects friends' entries into feed items: newest `created_at` first,
/// at most `limit` items, several items per friend allowed.
pub fn build_feed(
    mut entries: Vec<MediaEntryEntity>,
    profiles: &HashMap<Uuid, ProfileEntity>,
    limit: usize,
) -> Vec<ActivityItem> {
    entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    entries.truncate(limit);

    entries
        .into_iter()
        .map(|entry| {
            let profile = profiles.get(&entry.owner_id);
            ActivityItem {
                id: entry.id,
                user_id: entry.owner_id,
                user_name: profile
                    .map(|p| p.display_name.clone())
                    .unwrap_or_else(|| "Friend User".to_string()),
                user_avatar: profile.and_then(|p| p.avatar_url.clone()),
                action: ActivityAction::of(&entry),
                media_title: entry.title,
                media_type: entry.media_type,
                rating: entry.rating,
                review: entry.notes,
                created_at: entry.created_at,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::{entry, profile};
    use chrono::Duration;

    #[test]
    fn action_label_follows_precedence() {
        let owner = Uuid::new_v4();

        let mut consumed = entry(owner, "Dune", MediaType::Book, MediaStatus::Consumed, 4);
        consumed.notes = Some("great".into());
        assert_eq!(ActivityAction::of(&consumed), ActivityAction::Completed);

        let mut rated = entry(owner, "Heat", MediaType::Movie, MediaStatus::Consuming, 3);
        rated.notes = Some("tense".into());
        assert_eq!(ActivityAction::of(&rated), ActivityAction::Rated);

        let mut reviewed = entry(owner, "Serial", MediaType::Podcast, MediaStatus::OnList, 0);
        reviewed.notes = Some("recommended by a friend".into());
        assert_eq!(ActivityAction::of(&reviewed), ActivityAction::Reviewed);

        let mut saved = entry(owner, "Essay", MediaType::Article, MediaStatus::OnList, 0);
        saved.notes = Some(String::new());
        assert_eq!(ActivityAction::of(&saved), ActivityAction::Saved);
    }

    #[test]
    fn feed_is_newest_first_capped_and_not_deduplicated() {
        let friend = Uuid::new_v4();
        let base = chrono::Utc::now();
        let entries: Vec<_> = (0..12)
            .map(|i| {
                let title = format!("Book {i}");
                let mut e = entry(friend, &title, MediaType::Book, MediaStatus::OnList, 0);
                e.created_at = base - Duration::minutes(i);
                e
            })
            .rev()
            .collect();

        let profiles = HashMap::from([(friend, profile(friend, "friend@example.com", "Sam"))]);
        let feed = build_feed(entries, &profiles, 10);

        assert_eq!(feed.len(), 10);
        assert_eq!(feed[0].media_title, "Book 0");
        assert_eq!(feed[9].media_title, "Book 9");
        assert!(feed.windows(2).all(|w| w[0].created_at >= w[1].created_at));
        assert!(feed.iter().all(|item| item.user_id == friend && item.user_name == "Sam"));
    }

    #[test]
    fn feed_falls_back_when_friend_has_no_profile() {
        let friend = Uuid::new_v4();
        let entries = vec![entry(friend, "Dune", MediaType::Book, MediaStatus::OnList, 0)];

        let feed = build_feed(entries, &HashMap::new(), 10);
        assert_eq!(feed[0].user_name, "Friend User");
        assert!(feed[0].user_avatar.is_none());
        assert_eq!(feed[0].action, ActivityAction::Saved);
    }

    #[test]
    fn request_response_uses_placeholders_for_unknown_sender() {
        let request = FriendRequestEntity {
            id: Uuid::new_v4(),
            sender_id: Uuid::new_v4(),
            receiver_email: "me@example.com".into(),
            status: FriendRequestStatus::Pending,
            created_at: chrono::Utc::now(),
            resolved_at: None,
        };

        let response = FriendRequestResponse::new(request, None);
        assert_eq!(response.sender_email, "Unknown");
        assert_eq!(response.sender_name, "Unknown User");
    }
}
