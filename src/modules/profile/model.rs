use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::modules::profile::schema::ProfileEntity;

#[derive(Deserialize, Validate)]
pub struct UpsertProfileModel {
    #[validate(length(min = 1, max = 100, message = "Display name must be 1 to 100 characters"))]
    pub display_name: Option<String>,
    #[validate(url(message = "Avatar must be a valid URL"))]
    pub avatar_url: Option<String>,
}

#[derive(Deserialize, Validate)]
pub struct ProfileSearchQuery {
    #[serde(deserialize_with = "crate::utils::trimmed")]
    #[validate(length(min = 3, message = "Search query must be at least 3 characters long"))]
    pub email: String,
}

pub struct UpsertProfile {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

impl From<ProfileEntity> for ProfileResponse {
    fn from(entity: ProfileEntity) -> Self {
        ProfileResponse {
            id: entity.id,
            email: entity.email,
            display_name: entity.display_name,
            avatar_url: entity.avatar_url,
        }
    }
}

/// Display name used when a profile never set one: the email local part.
pub fn default_display_name(email: &str) -> String {
    match email.split_once('@') {
        Some((local, _)) if !local.is_empty() => local.to_string(),
        _ => email.to_string(),
    }
}
