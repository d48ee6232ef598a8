use serde::{Deserialize, Serialize};
use sqlx::prelude::{FromRow, Type};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(type_name = "media_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    Book,
    Movie,
    Podcast,
    Article,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Type, Serialize, Deserialize)]
#[sqlx(type_name = "media_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MediaStatus {
    #[default]
    OnList,
    Consuming,
    Consumed,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MediaEntryEntity {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub media_type: MediaType,
    pub status: MediaStatus,
    pub rating: i16,
    pub notes: Option<String>,
    pub cover_url: Option<String>,
    pub completed_at: Option<chrono::NaiveDate>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl MediaEntryEntity {
    pub fn has_notes(&self) -> bool {
        self.notes.as_deref().is_some_and(|n| !n.trim().is_empty())
    }
}
