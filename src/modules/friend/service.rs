use std::collections::HashMap;
use std::sync::Arc;

use log::info;
use uuid::Uuid;

use crate::{
    api::error,
    constants::FEED_LIMIT,
    modules::{
        friend::{
            model::{ActivityItem, FriendRequestResponse, FriendResponse, build_feed},
            repository::FriendRepo,
            schema::FriendRequestEntity,
        },
        media::{
            repository::MediaRepository,
            schema::{MediaEntryEntity, MediaType},
        },
        profile::{repository::ProfileRepository, schema::ProfileEntity},
    },
    utils::normalize_email,
};

#[derive(Clone)]
pub struct FriendService {
    friend_repo: Arc<dyn FriendRepo>,
    profile_repo: Arc<dyn ProfileRepository + Send + Sync>,
    media_repo: Arc<dyn MediaRepository + Send + Sync>,
}

impl FriendService {
    pub fn with_dependencies(
        friend_repo: Arc<dyn FriendRepo>,
        profile_repo: Arc<dyn ProfileRepository + Send + Sync>,
        media_repo: Arc<dyn MediaRepository + Send + Sync>,
    ) -> Self {
        info!("FriendService initialized with dependencies");
        FriendService { friend_repo, profile_repo, media_repo }
    }

    async fn profiles_by_id(
        &self,
        ids: &[Uuid],
    ) -> Result<HashMap<Uuid, ProfileEntity>, error::SystemError> {
        let profiles = self.profile_repo.find_by_ids(ids).await?;
        Ok(profiles.into_iter().map(|p| (p.id, p)).collect())
    }

    pub async fn is_friend(
        &self,
        user_id: Uuid,
        friend_id: Uuid,
    ) -> Result<bool, error::SystemError> {
        let friendship = self.friend_repo.find_friendship(&user_id, &friend_id).await?;
        Ok(friendship.is_some())
    }

    pub async fn get_friends(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<FriendResponse>, error::SystemError> {
        let ids = self.friend_repo.find_friend_ids(&user_id).await?;
        let mut profiles = self.profiles_by_id(&ids).await?;

        Ok(ids
            .into_iter()
            .map(|id| match profiles.remove(&id) {
                Some(profile) => FriendResponse::from(profile),
                None => FriendResponse::unknown(id),
            })
            .collect())
    }

    pub async fn remove_friend(
        &self,
        user_id: Uuid,
        friend_id: Uuid,
    ) -> Result<(), error::SystemError> {
        if !self.friend_repo.delete_friendship(&user_id, &friend_id).await? {
            return Err(error::SystemError::not_found("Friendship not found"));
        }

        info!("Friendship between {} and {} removed", user_id, friend_id);
        Ok(())
    }

    pub async fn send_friend_request(
        &self,
        sender_id: Uuid,
        sender_email: Option<String>,
        receiver_email: &str,
    ) -> Result<FriendRequestEntity, error::SystemError> {
        let receiver_email = normalize_email(receiver_email);
        let sender_email = sender_email.map(|e| normalize_email(&e));

        if sender_email.as_deref() == Some(receiver_email.as_str()) {
            return Err(error::SystemError::bad_request("Cannot send friend request to yourself"));
        }

        if let Some(receiver) = self.profile_repo.find_by_email(&receiver_email).await? {
            if receiver.id == sender_id {
                return Err(error::SystemError::bad_request(
                    "Cannot send friend request to yourself",
                ));
            }

            if self.is_friend(sender_id, receiver.id).await? {
                return Err(error::SystemError::conflict("Users are already friends"));
            }

            if let Some(sender_email) = &sender_email {
                let incoming =
                    self.friend_repo.find_pending_request(&receiver.id, sender_email).await?;
                if incoming.is_some() {
                    return Err(error::SystemError::conflict(
                        "This user already sent you a friend request, accept it instead",
                    ));
                }
            }
        }

        if self.friend_repo.find_pending_request(&sender_id, &receiver_email).await?.is_some() {
            return Err(error::SystemError::conflict("Friend request already sent"));
        }

        let request = self.friend_repo.create_friend_request(&sender_id, &receiver_email).await?;
        info!("Friend request {} sent by {}", request.id, sender_id);

        Ok(request)
    }

    pub async fn accept_friend_request(
        &self,
        user_id: Uuid,
        user_email: &str,
        request_id: Uuid,
    ) -> Result<FriendResponse, error::SystemError> {
        let request = self
            .friend_repo
            .accept_friend_request_atomic(&request_id, &user_id, &normalize_email(user_email))
            .await?;

        info!("Friend request {} accepted by {}", request_id, user_id);

        let sender = self.profile_repo.find_by_id(&request.sender_id).await?;
        Ok(match sender {
            Some(profile) => FriendResponse::from(profile),
            None => FriendResponse::unknown(request.sender_id),
        })
    }

    pub async fn reject_friend_request(
        &self,
        user_email: &str,
        request_id: Uuid,
    ) -> Result<(), error::SystemError> {
        let request = self
            .friend_repo
            .find_friend_request_by_id(&request_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Friend request not found"))?;

        if !request.is_addressed_to(user_email) {
            return Err(error::SystemError::forbidden(
                "You are not allowed to reject this friend request",
            ));
        }

        if self.friend_repo.reject_friend_request(&request_id).await?.is_none() {
            return Err(error::SystemError::conflict("Friend request has already been resolved"));
        }

        info!("Friend request {} rejected", request_id);
        Ok(())
    }

    pub async fn cancel_friend_request(
        &self,
        sender_id: Uuid,
        request_id: Uuid,
    ) -> Result<(), error::SystemError> {
        let request = self
            .friend_repo
            .find_friend_request_by_id(&request_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Friend request not found"))?;

        if request.sender_id != sender_id {
            return Err(error::SystemError::forbidden(
                "You are not allowed to cancel this friend request",
            ));
        }

        if !self.friend_repo.delete_pending_request(&request_id).await? {
            return Err(error::SystemError::conflict("Friend request has already been resolved"));
        }

        Ok(())
    }

    pub async fn get_incoming_requests(
        &self,
        user_email: &str,
    ) -> Result<Vec<FriendRequestResponse>, error::SystemError> {
        let mut requests =
            self.friend_repo.find_pending_to_email(&normalize_email(user_email)).await?;
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let sender_ids: Vec<Uuid> = requests.iter().map(|r| r.sender_id).collect();
        let profiles = self.profiles_by_id(&sender_ids).await?;

        Ok(requests
            .into_iter()
            .map(|r| {
                let sender = profiles.get(&r.sender_id);
                FriendRequestResponse::new(r, sender)
            })
            .collect())
    }

    pub async fn get_outgoing_requests(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<FriendRequestEntity>, error::SystemError> {
        let mut requests = self.friend_repo.find_pending_from_user(&user_id).await?;
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(requests)
    }

    pub async fn get_activity_feed(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<ActivityItem>, error::SystemError> {
        let friend_ids = self.friend_repo.find_friend_ids(&user_id).await?;
        if friend_ids.is_empty() {
            return Ok(Vec::new());
        }

        let (entries, profiles) = tokio::try_join!(
            self.media_repo.find_recent_by_owners(&friend_ids, FEED_LIMIT),
            self.profiles_by_id(&friend_ids),
        )?;

        Ok(build_feed(entries, &profiles, FEED_LIMIT as usize))
    }

    pub async fn get_friend_entries(
        &self,
        user_id: Uuid,
        friend_id: Uuid,
        media_type: Option<MediaType>,
    ) -> Result<Vec<MediaEntryEntity>, error::SystemError> {
        if !self.is_friend(user_id, friend_id).await? {
            return Err(error::SystemError::forbidden("You are not friends with this user"));
        }

        self.media_repo.find_by_owner(&friend_id, media_type).await
    }
}
