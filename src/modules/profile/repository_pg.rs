use uuid::Uuid;

use crate::{
    api::error,
    configs::Store,
    modules::profile::{model::UpsertProfile, repository::ProfileRepository, schema::ProfileEntity},
};

#[derive(Clone)]
pub struct ProfileRepositoryPg {
    store: Store,
}

impl ProfileRepositoryPg {
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait::async_trait]
impl ProfileRepository for ProfileRepositoryPg {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<ProfileEntity>, error::SystemError> {
        let profile = sqlx::query_as::<_, ProfileEntity>("SELECT * FROM profiles WHERE id = $1")
            .bind(id)
            .fetch_optional(self.store.pool()?)
            .await?;
        Ok(profile)
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<ProfileEntity>, error::SystemError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let profiles =
            sqlx::query_as::<_, ProfileEntity>("SELECT * FROM profiles WHERE id = ANY($1)")
                .bind(ids)
                .fetch_all(self.store.pool()?)
                .await?;
        Ok(profiles)
    }

    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<ProfileEntity>, error::SystemError> {
        let profile = sqlx::query_as::<_, ProfileEntity>(
            "SELECT * FROM profiles WHERE lower(email) = lower($1)",
        )
        .bind(email)
        .fetch_optional(self.store.pool()?)
        .await?;
        Ok(profile)
    }

    async fn upsert(&self, profile: &UpsertProfile) -> Result<ProfileEntity, error::SystemError> {
        let profile = sqlx::query_as::<_, ProfileEntity>(
            r#"
            INSERT INTO profiles (id, email, display_name, avatar_url)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE
            SET
                email        = EXCLUDED.email,
                display_name = EXCLUDED.display_name,
                avatar_url   = EXCLUDED.avatar_url,
                updated_at   = NOW()
            RETURNING *
            "#,
        )
        .bind(profile.id)
        .bind(&profile.email)
        .bind(&profile.display_name)
        .bind(&profile.avatar_url)
        .fetch_one(self.store.pool()?)
        .await?;
        Ok(profile)
    }

    async fn search_by_email(
        &self,
        query: &str,
        exclude: &Uuid,
        limit: i64,
    ) -> Result<Vec<ProfileEntity>, error::SystemError> {
        let search_pattern = format!("%{}%", query.replace('%', "\\%").replace('_', "\\_"));
        let profiles = sqlx::query_as::<_, ProfileEntity>(
            r#"
            SELECT * FROM profiles
            WHERE lower(email) LIKE lower($1)
              AND id <> $2
            ORDER BY email
            LIMIT $3
            "#,
        )
        .bind(&search_pattern)
        .bind(exclude)
        .bind(limit)
        .fetch_all(self.store.pool()?)
        .await?;
        Ok(profiles)
    }
}
