//! In-memory repositories and fixtures shared by the unit tests.

use std::cmp::Ordering;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};

use sqlx::{
    PgPool,
    postgres::{PgConnectOptions, PgPoolOptions},
};
use uuid::Uuid;

use crate::{
    api::error,
    configs::Store,
    modules::{
        friend::{
            repository::{FriendRepo, FriendRepository, FriendRequestRepository, check_acceptable},
            schema::{FriendRequestEntity, FriendRequestStatus, FriendshipEntity, ordered_pair},
        },
        media::{
            model::{InsertEntry, UpdateEntry},
            repository::MediaRepository,
            schema::{MediaEntryEntity, MediaStatus, MediaType},
        },
        profile::{
            model::{UpsertProfile, default_display_name},
            repository::ProfileRepository,
            schema::ProfileEntity,
        },
    },
    utils::Claims,
};

/// A freshly migrated schema on the database named by `DATABASE_URL`, private
/// to one test. `create` returns `None` when no database is configured.
pub struct PgSchema {
    pub store: Store,
    admin: PgPool,
    name: String,
}

impl PgSchema {
    pub async fn create() -> Option<Self> {
        let _ = dotenvy::dotenv();
        let Ok(url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL not set, skipping Postgres repository test");
            return None;
        };

        let name = format!("shelflog_test_{}", Uuid::new_v4().simple());
        let admin = PgPool::connect(&url).await.expect("connect to DATABASE_URL");
        sqlx::query(&format!("CREATE SCHEMA {name}"))
            .execute(&admin)
            .await
            .expect("create test schema");

        let options = url
            .parse::<PgConnectOptions>()
            .expect("parse DATABASE_URL")
            .options([("search_path", name.as_str())]);
        let pool = PgPoolOptions::new()
            .max_connections(2)
            .connect_with(options)
            .await
            .expect("connect to test schema");
        sqlx::migrate!("./migrations").run(&pool).await.expect("apply migrations");

        Some(Self { store: Store::Connected(pool), admin, name })
    }

    pub fn pool(&self) -> &PgPool {
        match &self.store {
            Store::Connected(pool) => pool,
            Store::Unavailable => unreachable!("test schema is always connected"),
        }
    }

    pub async fn teardown(self) {
        self.pool().close().await;
        sqlx::query(&format!("DROP SCHEMA {} CASCADE", self.name))
            .execute(&self.admin)
            .await
            .expect("drop test schema");
    }
}

pub fn claims_for(sub: Uuid, email: &str) -> Claims {
    Claims {
        sub,
        exp: chrono::Utc::now().timestamp() as u64 + 600,
        iat: None,
        email: Some(email.to_string()),
        role: Some("authenticated".to_string()),
    }
}

pub fn profile(id: Uuid, email: &str, display_name: &str) -> ProfileEntity {
    let now = chrono::Utc::now();
    ProfileEntity {
        id,
        email: email.to_string(),
        display_name: display_name.to_string(),
        avatar_url: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn entry(
    owner_id: Uuid,
    title: &str,
    media_type: MediaType,
    status: MediaStatus,
    rating: i16,
) -> MediaEntryEntity {
    let now = chrono::Utc::now();
    MediaEntryEntity {
        id: Uuid::new_v4(),
        owner_id,
        title: title.to_string(),
        media_type,
        status,
        rating,
        notes: None,
        cover_url: None,
        completed_at: None,
        created_at: now,
        updated_at: now,
    }
}

#[derive(Default)]
pub struct InMemoryProfiles {
    rows: Mutex<Vec<ProfileEntity>>,
}

impl InMemoryProfiles {
    /// Registers a profile named after the email local part.
    pub fn insert(&self, email: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.rows.lock().unwrap().push(profile(id, email, &default_display_name(email)));
        id
    }
}

#[async_trait::async_trait]
impl ProfileRepository for InMemoryProfiles {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<ProfileEntity>, error::SystemError> {
        Ok(self.rows.lock().unwrap().iter().find(|p| p.id == *id).cloned())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<ProfileEntity>, error::SystemError> {
        Ok(self.rows.lock().unwrap().iter().filter(|p| ids.contains(&p.id)).cloned().collect())
    }

    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<ProfileEntity>, error::SystemError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().find(|p| p.email.eq_ignore_ascii_case(email)).cloned())
    }

    async fn upsert(&self, upsert: &UpsertProfile) -> Result<ProfileEntity, error::SystemError> {
        let mut rows = self.rows.lock().unwrap();
        let now = chrono::Utc::now();
        match rows.iter_mut().find(|p| p.id == upsert.id) {
            Some(existing) => {
                existing.email = upsert.email.clone();
                existing.display_name = upsert.display_name.clone();
                existing.avatar_url = upsert.avatar_url.clone();
                existing.updated_at = now;
                Ok(existing.clone())
            }
            None => {
                let mut created = profile(upsert.id, &upsert.email, &upsert.display_name);
                created.avatar_url = upsert.avatar_url.clone();
                rows.push(created.clone());
                Ok(created)
            }
        }
    }

    async fn search_by_email(
        &self,
        query: &str,
        exclude: &Uuid,
        limit: i64,
    ) -> Result<Vec<ProfileEntity>, error::SystemError> {
        let query = query.to_lowercase();
        let mut found: Vec<ProfileEntity> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.id != *exclude && p.email.to_lowercase().contains(&query))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.email.cmp(&b.email));
        found.truncate(limit as usize);
        Ok(found)
    }
}

#[derive(Default)]
pub struct InMemoryMedia {
    rows: Mutex<Vec<MediaEntryEntity>>,
}

impl InMemoryMedia {
    pub fn put(&self, entry: MediaEntryEntity) {
        self.rows.lock().unwrap().push(entry);
    }
}

fn by_completion_then_creation(a: &MediaEntryEntity, b: &MediaEntryEntity) -> Ordering {
    let completed = match (a.completed_at, b.completed_at) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    completed.then_with(|| b.created_at.cmp(&a.created_at))
}

#[async_trait::async_trait]
impl MediaRepository for InMemoryMedia {
    async fn create(&self, insert: &InsertEntry) -> Result<MediaEntryEntity, error::SystemError> {
        let mut created =
            entry(insert.owner_id, &insert.title, insert.media_type, insert.status, insert.rating);
        created.notes = insert.notes.clone();
        created.cover_url = insert.cover_url.clone();
        created.completed_at = insert.completed_at;
        self.put(created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<MediaEntryEntity>, error::SystemError> {
        Ok(self.rows.lock().unwrap().iter().find(|e| e.id == *id).cloned())
    }

    async fn find_by_owner(
        &self,
        owner_id: &Uuid,
        media_type: Option<MediaType>,
    ) -> Result<Vec<MediaEntryEntity>, error::SystemError> {
        let mut entries: Vec<MediaEntryEntity> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.owner_id == *owner_id)
            .filter(|e| media_type.is_none_or(|t| e.media_type == t))
            .cloned()
            .collect();
        entries.sort_by(by_completion_then_creation);
        Ok(entries)
    }

    async fn update(
        &self,
        id: &Uuid,
        update: &UpdateEntry,
    ) -> Result<MediaEntryEntity, error::SystemError> {
        let mut rows = self.rows.lock().unwrap();
        let entry = rows
            .iter_mut()
            .find(|e| e.id == *id)
            .ok_or_else(|| error::SystemError::not_found("Entry not found"))?;

        if let Some(title) = &update.title {
            entry.title = title.clone();
        }
        if let Some(media_type) = update.media_type {
            entry.media_type = media_type;
        }
        if let Some(status) = update.status {
            entry.status = status;
        }
        if let Some(rating) = update.rating {
            entry.rating = rating;
        }
        if let Some(notes) = &update.notes {
            entry.notes = notes.clone();
        }
        if let Some(cover_url) = &update.cover_url {
            entry.cover_url = cover_url.clone();
        }
        if let Some(completed_at) = update.completed_at {
            entry.completed_at = completed_at;
        }
        entry.updated_at = chrono::Utc::now();
        Ok(entry.clone())
    }

    async fn delete(&self, id: &Uuid) -> Result<bool, error::SystemError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|e| e.id != *id);
        Ok(rows.len() < before)
    }

    async fn find_recent_by_owners(
        &self,
        owner_ids: &[Uuid],
        limit: i64,
    ) -> Result<Vec<MediaEntryEntity>, error::SystemError> {
        let mut entries: Vec<MediaEntryEntity> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|e| owner_ids.contains(&e.owner_id))
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        entries.truncate(limit as usize);
        Ok(entries)
    }
}

#[derive(Default)]
struct FriendTables {
    friendships: Vec<FriendshipEntity>,
    requests: Vec<FriendRequestEntity>,
}

/// Friend graph double. Both tables sit behind one lock so an accept either
/// applies completely or not at all, like the Postgres transaction.
#[derive(Default)]
pub struct InMemoryFriends {
    tables: Mutex<FriendTables>,
    fail_friendship_insert: AtomicBool,
}

impl InMemoryFriends {
    /// Makes the next accept fail while creating the friendship row.
    pub fn fail_next_friendship_insert(&self) {
        self.fail_friendship_insert.store(true, AtomicOrdering::SeqCst);
    }
}

#[async_trait::async_trait]
impl FriendRepository for InMemoryFriends {
    async fn find_friendship(
        &self,
        user_id_a: &Uuid,
        user_id_b: &Uuid,
    ) -> Result<Option<FriendshipEntity>, error::SystemError> {
        let (a, b) = ordered_pair(*user_id_a, *user_id_b);
        let tables = self.tables.lock().unwrap();
        Ok(tables.friendships.iter().find(|f| f.user_a == a && f.user_b == b).cloned())
    }

    async fn find_friend_ids(&self, user_id: &Uuid) -> Result<Vec<Uuid>, error::SystemError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .friendships
            .iter()
            .filter(|f| f.user_a == *user_id || f.user_b == *user_id)
            .map(|f| f.other(user_id))
            .collect())
    }

    async fn delete_friendship(
        &self,
        user_id_a: &Uuid,
        user_id_b: &Uuid,
    ) -> Result<bool, error::SystemError> {
        let (a, b) = ordered_pair(*user_id_a, *user_id_b);
        let mut tables = self.tables.lock().unwrap();
        let before = tables.friendships.len();
        tables.friendships.retain(|f| !(f.user_a == a && f.user_b == b));
        Ok(tables.friendships.len() < before)
    }
}

#[async_trait::async_trait]
impl FriendRequestRepository for InMemoryFriends {
    async fn find_pending_request(
        &self,
        sender_id: &Uuid,
        receiver_email: &str,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .requests
            .iter()
            .find(|r| {
                r.sender_id == *sender_id && r.is_pending() && r.is_addressed_to(receiver_email)
            })
            .cloned())
    }

    async fn find_friend_request_by_id(
        &self,
        request_id: &Uuid,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.requests.iter().find(|r| r.id == *request_id).cloned())
    }

    async fn find_pending_to_email(
        &self,
        receiver_email: &str,
    ) -> Result<Vec<FriendRequestEntity>, error::SystemError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .requests
            .iter()
            .filter(|r| r.is_pending() && r.is_addressed_to(receiver_email))
            .cloned()
            .collect())
    }

    async fn find_pending_from_user(
        &self,
        sender_id: &Uuid,
    ) -> Result<Vec<FriendRequestEntity>, error::SystemError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .requests
            .iter()
            .filter(|r| r.is_pending() && r.sender_id == *sender_id)
            .cloned()
            .collect())
    }

    async fn create_friend_request(
        &self,
        sender_id: &Uuid,
        receiver_email: &str,
    ) -> Result<FriendRequestEntity, error::SystemError> {
        let request = FriendRequestEntity {
            id: Uuid::new_v4(),
            sender_id: *sender_id,
            receiver_email: receiver_email.to_lowercase(),
            status: FriendRequestStatus::Pending,
            created_at: chrono::Utc::now(),
            resolved_at: None,
        };
        self.tables.lock().unwrap().requests.push(request.clone());
        Ok(request)
    }

    async fn reject_friend_request(
        &self,
        request_id: &Uuid,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError> {
        let mut tables = self.tables.lock().unwrap();
        Ok(tables.requests.iter_mut().find(|r| r.id == *request_id && r.is_pending()).map(|r| {
            r.status = FriendRequestStatus::Rejected;
            r.resolved_at = Some(chrono::Utc::now());
            r.clone()
        }))
    }

    async fn delete_pending_request(&self, request_id: &Uuid) -> Result<bool, error::SystemError> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.requests.len();
        tables.requests.retain(|r| !(r.id == *request_id && r.is_pending()));
        Ok(tables.requests.len() < before)
    }
}

#[async_trait::async_trait]
impl FriendRepo for InMemoryFriends {
    async fn accept_friend_request_atomic(
        &self,
        request_id: &Uuid,
        user_id: &Uuid,
        user_email: &str,
    ) -> Result<FriendRequestEntity, error::SystemError> {
        let mut tables = self.tables.lock().unwrap();

        let index = tables
            .requests
            .iter()
            .position(|r| r.id == *request_id)
            .ok_or_else(|| error::SystemError::not_found("Friend request not found"))?;

        check_acceptable(&tables.requests[index], user_id, user_email)?;

        if self.fail_friendship_insert.swap(false, AtomicOrdering::SeqCst) {
            return Err(error::SystemError::DatabaseError("friendship insert failed".into()));
        }

        let (user_a, user_b) = ordered_pair(tables.requests[index].sender_id, *user_id);
        if !tables.friendships.iter().any(|f| f.user_a == user_a && f.user_b == user_b) {
            tables.friendships.push(FriendshipEntity {
                user_a,
                user_b,
                created_at: chrono::Utc::now(),
            });
        }

        let request = &mut tables.requests[index];
        request.status = FriendRequestStatus::Accepted;
        request.resolved_at = Some(chrono::Utc::now());
        Ok(request.clone())
    }
}
