use actix_web::{delete, get, post, web, HttpRequest};
use uuid::Uuid;

use crate::{
    api::{error, success},
    middlewares::get_auth,
    modules::{
        conversation::repository_store::{ConversationStoreRepository, MessageStoreRepository},
        matches::{
            model::{CreateMatchBody, MatchAction},
            repository_store::MatchStoreRepository,
            schema::MatchEntity,
            service::MatchService,
        },
        pet::repository_store::PetStoreRepository,
        user::repository_store::UserStoreRepository,
    },
    utils::ValidatedJson,
};

pub type MatchSvc = MatchService<
    MatchStoreRepository,
    ConversationStoreRepository,
    MessageStoreRepository,
    PetStoreRepository,
    UserStoreRepository,
>;

#[post("/")]
pub async fn create_match(
    match_service: web::Data<MatchSvc>,
    body: ValidatedJson<CreateMatchBody>,
    req: HttpRequest,
) -> Result<success::Success<MatchEntity>, error::Error> {
    let sender_id = get_auth(&req)?.user_id;
    let entity = match_service.create_match(sender_id, body.0).await?;

    Ok(success::Success::created(Some(entity)).message("Match request sent successfully"))
}

#[get("/")]
pub async fn list_matches(
    match_service: web::Data<MatchSvc>,
    req: HttpRequest,
) -> Result<success::Success<Vec<MatchEntity>>, error::Error> {
    let user_id = get_auth(&req)?.user_id;
    let matches = match_service.get_matches(user_id).await;

    Ok(success::Success::ok(Some(matches)).message("Matches retrieved successfully"))
}

#[post("/{match_id}/accept")]
pub async fn accept_match(
    match_service: web::Data<MatchSvc>,
    match_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<MatchEntity>, error::Error> {
    let user_id = get_auth(&req)?.user_id;
    let entity =
        match_service.handle_match_action(user_id, *match_id, MatchAction::Accept).await?;

    Ok(success::Success::ok(Some(entity)).message("Match accepted successfully"))
}

#[post("/{match_id}/reject")]
pub async fn reject_match(
    match_service: web::Data<MatchSvc>,
    match_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<MatchEntity>, error::Error> {
    let user_id = get_auth(&req)?.user_id;
    let entity =
        match_service.handle_match_action(user_id, *match_id, MatchAction::Reject).await?;

    Ok(success::Success::ok(Some(entity)).message("Match rejected successfully"))
}

#[delete("/{match_id}")]
pub async fn delete_match(
    match_service: web::Data<MatchSvc>,
    match_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let user_id = get_auth(&req)?.user_id;
    match_service.delete_match(user_id, *match_id).await?;
    Ok(success::Success::no_content())
}
