use uuid::Uuid;

use crate::{
    api::error,
    modules::media::{
        model::{InsertEntry, UpdateEntry},
        schema::{MediaEntryEntity, MediaType},
    },
};

#[async_trait::async_trait]
pub trait MediaRepository {
    async fn create(&self, entry: &InsertEntry) -> Result<MediaEntryEntity, error::SystemError>;

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<MediaEntryEntity>, error::SystemError>;

    /// Entries of one owner, most recently completed first; entries without a
    /// completion date come last, newest first.
    async fn find_by_owner(
        &self,
        owner_id: &Uuid,
        media_type: Option<MediaType>,
    ) -> Result<Vec<MediaEntryEntity>, error::SystemError>;

    async fn update(
        &self,
        id: &Uuid,
        entry: &UpdateEntry,
    ) -> Result<MediaEntryEntity, error::SystemError>;

    async fn delete(&self, id: &Uuid) -> Result<bool, error::SystemError>;

    /// Newest entries (by `created_at`) across all given owners.
    async fn find_recent_by_owners(
        &self,
        owner_ids: &[Uuid],
        limit: i64,
    ) -> Result<Vec<MediaEntryEntity>, error::SystemError>;
}
