use actix::Actor;
use actix_cors::Cors;
use actix_web::{
    self, App, HttpServer,
    middleware::{from_fn, Logger},
    web,
};
use std::sync::{Arc, LazyLock};

use crate::{
    configs::connect_store,
    middlewares::authentication,
    modules::{
        conversation::{
            repository_store::{ConversationStoreRepository, MessageStoreRepository},
            service::ConversationService,
        },
        matches::{feed::MatchFeed, repository_store::MatchStoreRepository, service::MatchService},
        pet::{repository_store::PetStoreRepository, resolver::PetResolver},
        user::{repository_store::UserStoreRepository, resolver::IdentityResolver},
        websocket::{
            handler::websocket_handler,
            notify::{Notifier, WsNotifier},
            relay::spawn_match_relay,
            server::WebSocketServer,
        },
    },
};

mod api;
mod configs;
mod constants;
mod middlewares;
mod modules;
mod store;
mod utils;

pub static ENV: LazyLock<constants::Env> = LazyLock::new(|| {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();
    log::info!("Environment variables loaded from .env file");
    constants::Env::default()
});

#[actix_web::get("/")]
async fn health_check() -> &'static str {
    "Server is running"
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let store =
        connect_store().await.map_err(|_| std::io::Error::other("Record store connection error"))?;

    let ws_server = WebSocketServer::new().start();
    spawn_match_relay(store.clone(), ws_server.clone()).await;

    let match_repo = Arc::new(MatchStoreRepository::new(store.clone()));
    let pet_repo = Arc::new(PetStoreRepository::new(store.clone()));
    let user_repo = Arc::new(UserStoreRepository::new(store.clone()));

    let conversation_service = ConversationService::with_dependencies(
        Arc::new(ConversationStoreRepository::new(store.clone())),
        Arc::new(MessageStoreRepository::new(store.clone())),
        PetResolver::with_dependencies(pet_repo.clone(), user_repo.clone()),
        IdentityResolver::with_dependencies(user_repo.clone()),
    );

    let feed = MatchFeed::start(store.clone())
        .await
        .map_err(|_| std::io::Error::other("Match feed bootstrap error"))?;
    let notifier: Arc<dyn Notifier> = Arc::new(WsNotifier::new(ws_server.clone()));

    let match_service = MatchService::with_dependencies(
        match_repo,
        pet_repo,
        user_repo.clone(),
        IdentityResolver::with_dependencies(user_repo),
        conversation_service.clone(),
        feed,
        notifier,
    );

    println!("Starting server at http://{}:{}", ENV.ip.as_str(), ENV.port);
    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(ENV.frontend_url.as_str())
            .allow_any_method()
            .allow_any_header()
            .supports_credentials();

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(web::Data::new(match_service.clone()))
            .app_data(web::Data::new(conversation_service.clone()))
            .app_data(web::Data::new(ws_server.clone()))
            .service(health_check)
            .service(
                web::scope("/api").service(
                    web::scope("")
                        .wrap(from_fn(authentication))
                        .configure(modules::matches::route::configure)
                        .configure(modules::conversation::route::configure)
                        .route("/ws", web::get().to(websocket_handler)),
                ),
            )
    })
    .bind((ENV.ip.as_str(), ENV.port))?
    .workers(2)
    .run()
    .await
}
