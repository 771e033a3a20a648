use crate::modules::matches::handle::*;
use actix_web::web::{scope, ServiceConfig};

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/matches")
            .service(create_match)
            .service(list_matches)
            .service(accept_match)
            .service(reject_match)
            .service(delete_match),
    );
}
