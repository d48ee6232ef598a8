use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::constants::TOP_RATED_LIMIT;
use crate::modules::media::schema::{MediaEntryEntity, MediaStatus, MediaType};

#[derive(Deserialize, Validate)]
pub struct CreateEntryModel {
    #[validate(length(min = 1, max = 500, message = "Title must be 1 to 500 characters"))]
    pub title: String,
    pub media_type: MediaType,
    #[serde(default)]
    pub status: MediaStatus,
    #[serde(default)]
    #[validate(range(min = 0, max = 5, message = "Rating must be between 0 and 5"))]
    pub rating: i16,
    #[validate(length(max = 10000, message = "Notes are too long"))]
    pub notes: Option<String>,
    #[validate(url(message = "Cover must be a valid URL"))]
    pub cover_url: Option<String>,
    pub completed_at: Option<chrono::NaiveDate>,
}

#[derive(Deserialize, Validate)]
pub struct UpdateEntryModel {
    #[validate(length(min = 1, max = 500, message = "Title must be 1 to 500 characters"))]
    pub title: Option<String>,
    pub media_type: Option<MediaType>,
    pub status: Option<MediaStatus>,
    #[validate(range(min = 0, max = 5, message = "Rating must be between 0 and 5"))]
    pub rating: Option<i16>,
    #[serde(default, deserialize_with = "crate::utils::double_option")]
    #[validate(length(max = 10000, message = "Notes are too long"))]
    pub notes: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::utils::double_option")]
    #[validate(url(message = "Cover must be a valid URL"))]
    pub cover_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::utils::double_option")]
    pub completed_at: Option<Option<chrono::NaiveDate>>,
}

impl UpdateEntryModel {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.media_type.is_none()
            && self.status.is_none()
            && self.rating.is_none()
            && self.notes.is_none()
            && self.cover_url.is_none()
            && self.completed_at.is_none()
    }
}

#[derive(Deserialize, Validate)]
pub struct EntryQuery {
    #[serde(rename = "type")]
    pub media_type: Option<MediaType>,
}

pub struct InsertEntry {
    pub owner_id: Uuid,
    pub title: String,
    pub media_type: MediaType,
    pub status: MediaStatus,
    pub rating: i16,
    pub notes: Option<String>,
    pub cover_url: Option<String>,
    pub completed_at: Option<chrono::NaiveDate>,
}

pub struct UpdateEntry {
    pub title: Option<String>,
    pub media_type: Option<MediaType>,
    pub status: Option<MediaStatus>,
    pub rating: Option<i16>,
    pub notes: Option<Option<String>>,
    pub cover_url: Option<Option<String>>,
    pub completed_at: Option<Option<chrono::NaiveDate>>,
}

/// Blank optional text is stored as NULL.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[derive(Debug, Serialize)]
pub struct EntryStats {
    pub total: usize,
    pub books: usize,
    pub movies: usize,
    pub podcasts: usize,
    pub articles: usize,
    pub average_rating: f64,
    pub top_rated: Vec<MediaEntryEntity>,
    pub recent: Vec<MediaEntryEntity>,
}

impl EntryStats {
    /// `entries` must already be in list order; `recent` is its head.
    pub fn from_entries(entries: &[MediaEntryEntity]) -> Self {
        let count = |kind: MediaType| entries.iter().filter(|e| e.media_type == kind).count();

        let total = entries.len();
        let average_rating = if total == 0 {
            0.0
        } else {
            let sum: i64 = entries.iter().map(|e| i64::from(e.rating)).sum();
            ((sum as f64 / total as f64) * 10.0).round() / 10.0
        };

        let mut top_rated: Vec<MediaEntryEntity> =
            entries.iter().filter(|e| e.rating > 0).cloned().collect();
        // stable: ties keep list order
        top_rated.sort_by(|a, b| b.rating.cmp(&a.rating));
        top_rated.truncate(TOP_RATED_LIMIT);

        EntryStats {
            total,
            books: count(MediaType::Book),
            movies: count(MediaType::Movie),
            podcasts: count(MediaType::Podcast),
            articles: count(MediaType::Article),
            average_rating,
            top_rated,
            recent: entries.iter().take(TOP_RATED_LIMIT).cloned().collect(),
        }
    }
}
