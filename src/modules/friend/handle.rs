use actix_web::{HttpRequest, delete, get, post, web};
use uuid::Uuid;

use crate::{
    api::{error, success},
    middlewares::get_claims,
    modules::{
        friend::{
            model::{ActivityItem, FriendRequestBody, FriendRequestResponse, FriendResponse},
            schema::FriendRequestEntity,
            service::FriendService,
        },
        media::{model::EntryQuery, schema::MediaEntryEntity},
    },
    utils::{ValidatedJson, ValidatedQuery},
};

#[post("/requests")]
pub async fn send_friend_request(
    friend_service: web::Data<FriendService>,
    body: ValidatedJson<FriendRequestBody>,
    req: HttpRequest,
) -> Result<success::Success<FriendRequestEntity>, error::Error> {
    let claims = get_claims(&req)?;
    let request = friend_service
        .send_friend_request(claims.sub, claims.email, &body.0.receiver_email)
        .await?;

    Ok(success::Success::created(Some(request)).message("Friend request sent successfully"))
}

#[get("/requests")]
pub async fn list_incoming_requests(
    friend_service: web::Data<FriendService>,
    req: HttpRequest,
) -> Result<success::Success<Vec<FriendRequestResponse>>, error::Error> {
    let email = get_claims(&req)?.require_email()?;
    let requests = friend_service.get_incoming_requests(&email).await?;

    Ok(success::Success::ok(Some(requests)).message("Friend requests retrieved successfully"))
}

#[get("/requests/sent")]
pub async fn list_outgoing_requests(
    friend_service: web::Data<FriendService>,
    req: HttpRequest,
) -> Result<success::Success<Vec<FriendRequestEntity>>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    let requests = friend_service.get_outgoing_requests(user_id).await?;

    Ok(success::Success::ok(Some(requests)).message("Sent requests retrieved successfully"))
}

#[post("/requests/{request_id}/accept")]
pub async fn accept_friend_request(
    friend_service: web::Data<FriendService>,
    request_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<FriendResponse>, error::Error> {
    let claims = get_claims(&req)?;
    let email = claims.require_email()?;
    let friend = friend_service.accept_friend_request(claims.sub, &email, *request_id).await?;

    Ok(success::Success::ok(Some(friend)).message("Friend request accepted successfully"))
}

#[post("/requests/{request_id}/reject")]
pub async fn reject_friend_request(
    friend_service: web::Data<FriendService>,
    request_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let email = get_claims(&req)?.require_email()?;
    friend_service.reject_friend_request(&email, *request_id).await?;
    Ok(success::Success::no_content())
}

#[delete("/requests/{request_id}")]
pub async fn cancel_friend_request(
    friend_service: web::Data<FriendService>,
    request_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    friend_service.cancel_friend_request(user_id, *request_id).await?;
    Ok(success::Success::no_content())
}

#[get("")]
pub async fn list_friends(
    friend_service: web::Data<FriendService>,
    req: HttpRequest,
) -> Result<success::Success<Vec<FriendResponse>>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    let friends = friend_service.get_friends(user_id).await?;

    Ok(success::Success::ok(Some(friends)).message("Friends retrieved successfully"))
}

#[get("/activity")]
pub async fn activity_feed(
    friend_service: web::Data<FriendService>,
    req: HttpRequest,
) -> Result<success::Success<Vec<ActivityItem>>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    let feed = friend_service.get_activity_feed(user_id).await?;

    Ok(success::Success::ok(Some(feed)).message("Activity retrieved successfully"))
}

#[get("/{friend_id:[0-9a-fA-F-]{36}}/entries")]
pub async fn list_friend_entries(
    friend_service: web::Data<FriendService>,
    friend_id: web::Path<Uuid>,
    query: ValidatedQuery<EntryQuery>,
    req: HttpRequest,
) -> Result<success::Success<Vec<MediaEntryEntity>>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    let entries =
        friend_service.get_friend_entries(user_id, *friend_id, query.0.media_type).await?;

    Ok(success::Success::ok(Some(entries)).message("Entries retrieved successfully"))
}

#[delete("/{friend_id:[0-9a-fA-F-]{36}}")]
pub async fn remove_friend(
    friend_service: web::Data<FriendService>,
    friend_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let user_id = get_claims(&req)?.sub;
    friend_service.remove_friend(user_id, *friend_id).await?;
    Ok(success::Success::no_content())
}
