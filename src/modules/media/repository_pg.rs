use uuid::Uuid;

use crate::{
    api::error,
    configs::Store,
    modules::media::{
        model::{InsertEntry, UpdateEntry},
        repository::MediaRepository,
        schema::{MediaEntryEntity, MediaType},
    },
};

#[derive(Clone)]
pub struct MediaRepositoryPg {
    store: Store,
}

impl MediaRepositoryPg {
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait::async_trait]
impl MediaRepository for MediaRepositoryPg {
    async fn create(&self, entry: &InsertEntry) -> Result<MediaEntryEntity, error::SystemError> {
        let id = Uuid::new_v7(uuid::Timestamp::now(uuid::NoContext));
        let entry = sqlx::query_as::<_, MediaEntryEntity>(
            r#"
            INSERT INTO media_entries
                (id, owner_id, title, media_type, status, rating, notes, cover_url, completed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(entry.owner_id)
        .bind(&entry.title)
        .bind(entry.media_type)
        .bind(entry.status)
        .bind(entry.rating)
        .bind(&entry.notes)
        .bind(&entry.cover_url)
        .bind(entry.completed_at)
        .fetch_one(self.store.pool()?)
        .await?;
        Ok(entry)
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<MediaEntryEntity>, error::SystemError> {
        let entry =
            sqlx::query_as::<_, MediaEntryEntity>("SELECT * FROM media_entries WHERE id = $1")
                .bind(id)
                .fetch_optional(self.store.pool()?)
                .await?;
        Ok(entry)
    }

    async fn find_by_owner(
        &self,
        owner_id: &Uuid,
        media_type: Option<MediaType>,
    ) -> Result<Vec<MediaEntryEntity>, error::SystemError> {
        let entries = sqlx::query_as::<_, MediaEntryEntity>(
            r#"
            SELECT * FROM media_entries
            WHERE owner_id = $1
              AND ($2::media_type IS NULL OR media_type = $2)
            ORDER BY completed_at DESC NULLS LAST, created_at DESC
            "#,
        )
        .bind(owner_id)
        .bind(media_type)
        .fetch_all(self.store.pool()?)
        .await?;
        Ok(entries)
    }

    async fn update(
        &self,
        id: &Uuid,
        entry: &UpdateEntry,
    ) -> Result<MediaEntryEntity, error::SystemError> {
        let entry = sqlx::query_as::<_, MediaEntryEntity>(
            r#"
        UPDATE media_entries
        SET
            title        = COALESCE($2, title),
            media_type   = COALESCE($3, media_type),
            status       = COALESCE($4, status),
            rating       = COALESCE($5, rating),
            notes        = CASE WHEN $6::boolean THEN $7 ELSE notes END,
            cover_url    = CASE WHEN $8::boolean THEN $9 ELSE cover_url END,
            completed_at = CASE WHEN $10::boolean THEN $11 ELSE completed_at END,
            updated_at   = NOW()
        WHERE id = $1
        RETURNING *
        "#,
        )
        .bind(id)
        .bind(&entry.title) // $2: Option<String>
        .bind(entry.media_type) // $3: Option<MediaType>
        .bind(entry.status) // $4: Option<MediaStatus>
        .bind(entry.rating) // $5: Option<i16>
        .bind(entry.notes.is_some()) // $6: was notes provided?
        .bind(entry.notes.as_ref().and_then(|v| v.as_ref())) // $7
        .bind(entry.cover_url.is_some()) // $8: was cover_url provided?
        .bind(entry.cover_url.as_ref().and_then(|v| v.as_ref())) // $9
        .bind(entry.completed_at.is_some()) // $10: was completed_at provided?
        .bind(entry.completed_at.flatten()) // $11
        .fetch_optional(self.store.pool()?)
        .await?
        .ok_or_else(|| error::SystemError::not_found("Entry not found"))?;

        Ok(entry)
    }

    async fn delete(&self, id: &Uuid) -> Result<bool, error::SystemError> {
        let rows = sqlx::query("DELETE FROM media_entries WHERE id = $1")
            .bind(id)
            .execute(self.store.pool()?)
            .await?
            .rows_affected();

        Ok(rows > 0)
    }

    async fn find_recent_by_owners(
        &self,
        owner_ids: &[Uuid],
        limit: i64,
    ) -> Result<Vec<MediaEntryEntity>, error::SystemError> {
        if owner_ids.is_empty() {
            return Ok(Vec::new());
        }

        let entries = sqlx::query_as::<_, MediaEntryEntity>(
            r#"
            SELECT * FROM media_entries
            WHERE owner_id = ANY($1)
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(owner_ids)
        .bind(limit)
        .fetch_all(self.store.pool()?)
        .await?;
        Ok(entries)
    }
}
