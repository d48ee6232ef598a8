use actix_web::{HttpRequest, get, put, web};
use uuid::Uuid;

use crate::{
    api::{error, success},
    middlewares::get_claims,
    modules::profile::{
        model::{ProfileResponse, ProfileSearchQuery, UpsertProfileModel},
        service::ProfileService,
    },
    utils::{ValidatedJson, ValidatedQuery},
};

#[get("/me")]
pub async fn get_me(
    profile_service: web::Data<ProfileService>,
    req: HttpRequest,
) -> Result<success::Success<ProfileResponse>, error::Error> {
    let id = get_claims(&req)?.sub;
    let profile = profile_service.get_by_id(id).await?;
    Ok(success::Success::ok(Some(profile)).message("Profile retrieved successfully"))
}

#[put("/me")]
pub async fn upsert_me(
    profile_service: web::Data<ProfileService>,
    body: ValidatedJson<UpsertProfileModel>,
    req: HttpRequest,
) -> Result<success::Success<ProfileResponse>, error::Error> {
    let claims = get_claims(&req)?;
    let profile = profile_service.upsert_me(&claims, body.0).await?;
    Ok(success::Success::ok(Some(profile)).message("Profile saved successfully"))
}

#[get("/search")]
pub async fn search_profiles(
    profile_service: web::Data<ProfileService>,
    query: ValidatedQuery<ProfileSearchQuery>,
    req: HttpRequest,
) -> Result<success::Success<Vec<ProfileResponse>>, error::Error> {
    let caller = get_claims(&req)?.sub;
    let profiles = profile_service.search_by_email(caller, &query.0.email).await?;
    Ok(success::Success::ok(Some(profiles)).message("Profiles retrieved successfully"))
}

#[get("/{id:[0-9a-fA-F-]{36}}")]
pub async fn get_profile(
    profile_service: web::Data<ProfileService>,
    profile_id: web::Path<Uuid>,
) -> Result<success::Success<ProfileResponse>, error::Error> {
    let profile = profile_service.get_by_id(profile_id.into_inner()).await?;
    Ok(success::Success::ok(Some(profile)).message("Profile retrieved successfully"))
}
