use log::info;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::error;
use crate::modules::media::model::{
    CreateEntryModel, EntryStats, InsertEntry, UpdateEntry, UpdateEntryModel, non_blank,
};
use crate::modules::media::repository::MediaRepository;
use crate::modules::media::schema::{MediaEntryEntity, MediaType};

#[derive(Clone)]
pub struct MediaService {
    repo: Arc<dyn MediaRepository + Send + Sync>,
}

impl MediaService {
    pub fn with_dependencies(repo: Arc<dyn MediaRepository + Send + Sync>) -> Self {
        info!("MediaService initialized with dependencies");
        MediaService { repo }
    }

    pub async fn create_entry(
        &self,
        owner_id: Uuid,
        model: CreateEntryModel,
    ) -> Result<MediaEntryEntity, error::SystemError> {
        let title = model.title.trim().to_string();
        if title.is_empty() {
            return Err(error::SystemError::bad_request("Title cannot be blank"));
        }

        let entry = self
            .repo
            .create(&InsertEntry {
                owner_id,
                title,
                media_type: model.media_type,
                status: model.status,
                rating: model.rating,
                notes: non_blank(model.notes),
                cover_url: non_blank(model.cover_url),
                completed_at: model.completed_at,
            })
            .await?;

        info!("Entry {} created for {}", entry.id, owner_id);
        Ok(entry)
    }

    pub async fn list_entries(
        &self,
        owner_id: Uuid,
        media_type: Option<MediaType>,
    ) -> Result<Vec<MediaEntryEntity>, error::SystemError> {
        self.repo.find_by_owner(&owner_id, media_type).await
    }

    /// Loads an entry and checks it belongs to `owner_id`.
    pub async fn get_entry(
        &self,
        owner_id: Uuid,
        entry_id: Uuid,
    ) -> Result<MediaEntryEntity, error::SystemError> {
        let entry = self
            .repo
            .find_by_id(&entry_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Entry not found"))?;

        if entry.owner_id != owner_id {
            return Err(error::SystemError::forbidden("You do not own this entry"));
        }

        Ok(entry)
    }

    pub async fn update_entry(
        &self,
        owner_id: Uuid,
        entry_id: Uuid,
        model: UpdateEntryModel,
    ) -> Result<MediaEntryEntity, error::SystemError> {
        if model.is_empty() {
            return Err(error::SystemError::bad_request("No fields to update"));
        }

        let title = match model.title {
            Some(title) => {
                let title = title.trim().to_string();
                if title.is_empty() {
                    return Err(error::SystemError::bad_request("Title cannot be blank"));
                }
                Some(title)
            }
            None => None,
        };

        self.get_entry(owner_id, entry_id).await?;

        let update = UpdateEntry {
            title,
            media_type: model.media_type,
            status: model.status,
            rating: model.rating,
            notes: model.notes.map(non_blank),
            cover_url: model.cover_url.map(non_blank),
            completed_at: model.completed_at,
        };

        self.repo.update(&entry_id, &update).await
    }

    pub async fn delete_entry(
        &self,
        owner_id: Uuid,
        entry_id: Uuid,
    ) -> Result<(), error::SystemError> {
        self.get_entry(owner_id, entry_id).await?;

        if !self.repo.delete(&entry_id).await? {
            return Err(error::SystemError::not_found("Entry not found"));
        }

        info!("Entry {} deleted by {}", entry_id, owner_id);
        Ok(())
    }

    pub async fn entry_stats(&self, owner_id: Uuid) -> Result<EntryStats, error::SystemError> {
        let entries = self.repo.find_by_owner(&owner_id, None).await?;
        Ok(EntryStats::from_entries(&entries))
    }
}
