use uuid::Uuid;

use crate::{
    api::error,
    modules::profile::{model::UpsertProfile, schema::ProfileEntity},
};

#[async_trait::async_trait]
pub trait ProfileRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<ProfileEntity>, error::SystemError>;

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<ProfileEntity>, error::SystemError>;

    async fn find_by_email(&self, email: &str)
    -> Result<Option<ProfileEntity>, error::SystemError>;

    async fn upsert(&self, profile: &UpsertProfile) -> Result<ProfileEntity, error::SystemError>;

    /// Case-insensitive partial match on email, never returning `exclude`.
    async fn search_by_email(
        &self,
        query: &str,
        exclude: &Uuid,
        limit: i64,
    ) -> Result<Vec<ProfileEntity>, error::SystemError>;
}
