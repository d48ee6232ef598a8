use log::info;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::error;
use crate::configs::RedisCache;
use crate::constants::{PROFILE_CACHE_TTL, PROFILE_SEARCH_LIMIT};
use crate::modules::profile::model::{
    ProfileResponse, UpsertProfile, UpsertProfileModel, default_display_name,
};
use crate::modules::profile::repository::ProfileRepository;
use crate::utils::{Claims, normalize_email};

#[derive(Clone)]
pub struct ProfileService {
    repo: Arc<dyn ProfileRepository + Send + Sync>,
    cache: Arc<RedisCache>,
}

fn cache_key(id: &Uuid) -> String {
    format!("profile:{}", id)
}

impl ProfileService {
    pub fn with_dependencies(
        repo: Arc<dyn ProfileRepository + Send + Sync>,
        cache: Arc<RedisCache>,
    ) -> Self {
        info!("ProfileService initialized with dependencies");
        ProfileService { repo, cache }
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<ProfileResponse, error::SystemError> {
        let key = cache_key(&id);
        if let Some(cached) = self.cache.get::<ProfileResponse>(&key).await? {
            info!("Profile {} found in cache", id);
            return Ok(cached);
        }

        let entity = self
            .repo
            .find_by_id(&id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Profile not found"))?;

        let profile = ProfileResponse::from(entity);
        self.cache.set(&key, &profile, PROFILE_CACHE_TTL).await?;
        Ok(profile)
    }

    /// Registers or refreshes the caller's profile. The email always comes from
    /// the verified token; omitted fields keep their stored value.
    pub async fn upsert_me(
        &self,
        claims: &Claims,
        model: UpsertProfileModel,
    ) -> Result<ProfileResponse, error::SystemError> {
        let email = claims.require_email()?;
        let existing = self.repo.find_by_id(&claims.sub).await?;

        let display_name = model
            .display_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .or_else(|| existing.as_ref().map(|p| p.display_name.clone()))
            .unwrap_or_else(|| default_display_name(&email));

        let avatar_url = model.avatar_url.or_else(|| existing.and_then(|p| p.avatar_url));

        let entity = self
            .repo
            .upsert(&UpsertProfile { id: claims.sub, email, display_name, avatar_url })
            .await?;

        self.cache.delete(&cache_key(&claims.sub)).await?;
        info!("Profile {} upserted", claims.sub);

        Ok(ProfileResponse::from(entity))
    }

    pub async fn search_by_email(
        &self,
        caller: Uuid,
        query: &str,
    ) -> Result<Vec<ProfileResponse>, error::SystemError> {
        let query = normalize_email(query);
        let profiles = self.repo.search_by_email(&query, &caller, PROFILE_SEARCH_LIMIT).await?;
        Ok(profiles.into_iter().map(ProfileResponse::from).collect())
    }
}
