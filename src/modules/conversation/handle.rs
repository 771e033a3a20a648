use actix_web::{get, web, HttpRequest};
use uuid::Uuid;

use crate::{
    api::{error, success},
    middlewares::get_auth,
    modules::{
        conversation::{
            repository_store::{ConversationStoreRepository, MessageStoreRepository},
            schema::{ConversationEntity, MessageEntity},
            service::ConversationService,
        },
        pet::repository_store::PetStoreRepository,
        user::repository_store::UserStoreRepository,
    },
};

pub type ConversationSvc = ConversationService<
    ConversationStoreRepository,
    MessageStoreRepository,
    PetStoreRepository,
    UserStoreRepository,
>;

#[get("/")]
pub async fn get_conversations(
    conversation_svc: web::Data<ConversationSvc>,
    req: HttpRequest,
) -> Result<success::Success<Vec<ConversationEntity>>, error::Error> {
    let user_id = get_auth(&req)?.user_id;
    let conversations = conversation_svc.get_by_user_id(user_id).await?;

    Ok(success::Success::ok(Some(conversations)).message("Conversations retrieved successfully"))
}

#[get("/{conversation_id}")]
pub async fn get_conversation(
    conversation_svc: web::Data<ConversationSvc>,
    conversation_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<ConversationEntity>, error::Error> {
    let user_id = get_auth(&req)?.user_id;
    let conversation = conversation_svc.get_by_id(*conversation_id).await?;

    if !conversation.involves(&user_id) {
        return Err(error::Error::forbidden("You are not part of this conversation"));
    }

    Ok(success::Success::ok(Some(conversation)).message("Conversation retrieved successfully"))
}

#[get("/{conversation_id}/messages")]
pub async fn get_messages(
    conversation_svc: web::Data<ConversationSvc>,
    conversation_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<Vec<MessageEntity>>, error::Error> {
    let user_id = get_auth(&req)?.user_id;
    let conversation = conversation_svc.get_by_id(*conversation_id).await?;

    if !conversation.involves(&user_id) {
        return Err(error::Error::forbidden("You are not part of this conversation"));
    }

    let messages = conversation_svc.get_messages(*conversation_id).await?;
    Ok(success::Success::ok(Some(messages)).message("Messages retrieved successfully"))
}
