use actix_web::{HttpRequest, delete, get, patch, post, web};
use uuid::Uuid;

use crate::{
    api::{error, success},
    middlewares::get_claims,
    modules::media::{
        model::{CreateEntryModel, EntryQuery, EntryStats, UpdateEntryModel},
        schema::MediaEntryEntity,
        service::MediaService,
    },
    utils::{ValidatedJson, ValidatedQuery},
};

#[post("")]
pub async fn create_entry(
    media_service: web::Data<MediaService>,
    body: ValidatedJson<CreateEntryModel>,
    req: HttpRequest,
) -> Result<success::Success<MediaEntryEntity>, error::Error> {
    let owner_id = get_claims(&req)?.sub;
    let entry = media_service.create_entry(owner_id, body.0).await?;
    Ok(success::Success::created(Some(entry)).message("Entry created successfully"))
}

#[get("")]
pub async fn list_entries(
    media_service: web::Data<MediaService>,
    query: ValidatedQuery<EntryQuery>,
    req: HttpRequest,
) -> Result<success::Success<Vec<MediaEntryEntity>>, error::Error> {
    let owner_id = get_claims(&req)?.sub;
    let entries = media_service.list_entries(owner_id, query.0.media_type).await?;
    Ok(success::Success::ok(Some(entries)).message("Entries retrieved successfully"))
}

#[get("/stats")]
pub async fn entry_stats(
    media_service: web::Data<MediaService>,
    req: HttpRequest,
) -> Result<success::Success<EntryStats>, error::Error> {
    let owner_id = get_claims(&req)?.sub;
    let stats = media_service.entry_stats(owner_id).await?;
    Ok(success::Success::ok(Some(stats)).message("Stats retrieved successfully"))
}

#[get("/{id:[0-9a-fA-F-]{36}}")]
pub async fn get_entry(
    media_service: web::Data<MediaService>,
    entry_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<MediaEntryEntity>, error::Error> {
    let owner_id = get_claims(&req)?.sub;
    let entry = media_service.get_entry(owner_id, entry_id.into_inner()).await?;
    Ok(success::Success::ok(Some(entry)).message("Entry retrieved successfully"))
}

#[patch("/{id:[0-9a-fA-F-]{36}}")]
pub async fn update_entry(
    media_service: web::Data<MediaService>,
    entry_id: web::Path<Uuid>,
    body: ValidatedJson<UpdateEntryModel>,
    req: HttpRequest,
) -> Result<success::Success<MediaEntryEntity>, error::Error> {
    let owner_id = get_claims(&req)?.sub;
    let entry = media_service.update_entry(owner_id, entry_id.into_inner(), body.0).await?;
    Ok(success::Success::ok(Some(entry)).message("Entry updated successfully"))
}

#[delete("/{id:[0-9a-fA-F-]{36}}")]
pub async fn delete_entry(
    media_service: web::Data<MediaService>,
    entry_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let owner_id = get_claims(&req)?.sub;
    media_service.delete_entry(owner_id, entry_id.into_inner()).await?;
    Ok(success::Success::no_content())
}
