use actix_cors::Cors;
use actix_web::{
    self, App, HttpServer,
    middleware::{Logger, from_fn},
    web,
};
use std::sync::{Arc, LazyLock};

use crate::{
    configs::{RedisCache, Store, connect_store},
    constants::AUTHENTICATED_ROLE,
    middlewares::{authentication, authorization},
    modules::{
        friend::{repository_pg::FriendRepositoryPg, service::FriendService},
        media::{repository_pg::MediaRepositoryPg, service::MediaService},
        profile::{repository_pg::ProfileRepositoryPg, service::ProfileService},
    },
};

mod api;
mod configs;
mod constants;
mod middlewares;
mod modules;
#[cfg(test)]
mod test;
mod utils;

pub static ENV: LazyLock<constants::Env> = LazyLock::new(|| {
    dotenvy::dotenv().ok();
    constants::Env::default()
});

#[actix_web::get("/")]
async fn health_check(store: web::Data<Store>) -> &'static str {
    if store.is_available() {
        "Server is running"
    } else {
        "Server is running without a data store"
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
    LazyLock::force(&ENV);
    log::info!("Environment variables loaded from .env file");

    let store = connect_store(ENV.database_url.as_deref())
        .await
        .map_err(|e| std::io::Error::other(format!("Database connection error: {e}")))?;

    let redis_cache = RedisCache::new(ENV.redis_url.as_deref())
        .await
        .map_err(|e| std::io::Error::other(format!("Redis connection error: {e}")))?;

    let profile_repo = Arc::new(ProfileRepositoryPg::new(store.clone()));
    let media_repo = Arc::new(MediaRepositoryPg::new(store.clone()));
    let friend_repo = Arc::new(FriendRepositoryPg::new(store.clone()));

    let profile_service =
        ProfileService::with_dependencies(profile_repo.clone(), Arc::new(redis_cache));
    let media_service = MediaService::with_dependencies(media_repo.clone());
    let friend_service = FriendService::with_dependencies(friend_repo, profile_repo, media_repo);

    log::info!("Starting server at http://{}:{}", ENV.ip.as_str(), ENV.port);
    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(ENV.frontend_url.as_str())
            .allow_any_method()
            .allow_any_header()
            .supports_credentials()
            .max_age(3600);

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(web::Data::new(profile_service.clone()))
            .app_data(web::Data::new(media_service.clone()))
            .app_data(web::Data::new(friend_service.clone()))
            .app_data(web::Data::new(store.clone()))
            .service(health_check)
            .service(
                web::scope("/api")
                    .wrap(from_fn(authorization(vec![AUTHENTICATED_ROLE])))
                    .wrap(from_fn(authentication))
                    .configure(modules::profile::route::configure)
                    .configure(modules::media::route::configure)
                    .configure(modules::friend::route::configure),
            )
    })
    .bind((ENV.ip.as_str(), ENV.port))?
    .workers(ENV.workers)
    .run()
    .await
}
