use actix_web::{
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    middleware::Next,
    Error, HttpMessage, HttpRequest,
};
use uuid::Uuid;

use crate::api::error;

/// Caller identity established by the authenticating gateway in front of
/// this service. Session issuance and token verification live there; the
/// gateway forwards the resolved user id with every proxied request.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: Uuid,
}

pub async fn authentication<B>(
    req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<B>, Error>
where
    B: MessageBody + 'static,
{
    let header = req.headers().get("X-User-Id").and_then(|h| h.to_str().ok());
    let user_id = match header.and_then(|raw| Uuid::parse_str(raw).ok()) {
        Some(id) => id,
        None => {
            return Err(error::Error::unauthorized("Missing or invalid gateway identity").into());
        }
    };

    req.extensions_mut().insert(AuthContext { user_id });

    next.call(req).await
}

pub fn get_auth(req: &HttpRequest) -> Result<AuthContext, error::Error> {
    let extensions = req.extensions();

    let auth = extensions
        .get::<AuthContext>()
        .ok_or_else(|| error::Error::unauthorized("Unauthorized"))?
        .clone();

    Ok(auth)
}
