use actix::Actor;
use actix_cors::Cors;
use actix_web::{
    self, App, HttpServer, http,
    middleware::{Logger, from_fn},
    web,
};
use std::sync::{Arc, LazyLock};

use crate::{
    configs::{RedisCache, connect_database},
    middlewares::{authentication, authorization},
    modules::{
        activity::{repository_pg::ActivityRepositoryPg, service::ActivityService},
        basic_info::{repository_pg::BasicInfoRepositoryPg, service::BasicInfoService},
        friend::{repository_pg::FriendRepositoryPg, service::FriendService},
        prompt::{repository_pg::PromptRepositoryPg, service::PromptService},
        report::{repository_pg::ReportRepositoryPg, service::ReportService},
        saved_message::{repository_pg::SavedMessageRepositoryPg, service::SavedMessageService},
        user::{repository_pg::UserRepositoryPg, schema::UserRole, service::UserService},
        websocket::{handler::websocket_handler, publisher::EventPublisher, server::WebSocketServer},
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
    env_logger::init();
    log::info!("Environment variables loaded from .env file");
    constants::Env::default()
});

#[actix_web::get("/")]
async fn health_check() -> &'static str {
    "Server is running"
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let db_pool =
        connect_database().await.map_err(|_| std::io::Error::other("Database connection error"))?;

    let redis_pool =
        RedisCache::new().await.map_err(|_| std::io::Error::other("Redis connection error"))?;

    let user_repo = Arc::new(UserRepositoryPg::new(db_pool.clone()));
    let friend_repo = Arc::new(FriendRepositoryPg::new(db_pool.clone()));
    let prompt_repo = Arc::new(PromptRepositoryPg::new(db_pool.clone()));
    let activity_repo = Arc::new(ActivityRepositoryPg::new(db_pool.clone()));

    let ws_server = WebSocketServer::new().start();
    let publisher: Arc<dyn EventPublisher> = Arc::new(ws_server.clone());

    let user_service = UserService::with_dependencies(user_repo.clone(), Arc::new(redis_pool));
    let basic_info_service =
        BasicInfoService::with_dependencies(Arc::new(BasicInfoRepositoryPg::new(db_pool.clone())));
    let friend_service =
        FriendService::with_dependencies(friend_repo.clone(), user_repo.clone(), publisher.clone());
    let activity_service = Arc::new(ActivityService::with_dependencies(
        activity_repo,
        friend_repo.clone(),
        prompt_repo.clone(),
        publisher.clone(),
    ));
    let prompt_service = PromptService::with_dependencies(
        prompt_repo.clone(),
        friend_repo.clone(),
        user_repo.clone(),
        activity_service.clone(),
        publisher,
    );
    let saved_message_service = SavedMessageService::with_dependencies(
        Arc::new(SavedMessageRepositoryPg::new(db_pool.clone())),
        friend_repo,
    );
    let report_service = ReportService::with_dependencies(
        Arc::new(ReportRepositoryPg::new(db_pool.clone())),
        user_repo,
        prompt_repo,
    );

    let user_service = web::Data::new(user_service);
    let basic_info_service = web::Data::new(basic_info_service);
    let friend_service = web::Data::new(friend_service);
    let activity_service = web::Data::from(activity_service);
    let prompt_service = web::Data::new(prompt_service);
    let saved_message_service = web::Data::new(saved_message_service);
    let report_service = web::Data::new(report_service);
    let ws_server = web::Data::new(ws_server);

    log::info!("Starting server at http://{}:{}", ENV.ip.as_str(), ENV.port);
    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&ENV.frontend_url)
            .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE"])
            .allowed_headers(vec![http::header::AUTHORIZATION, http::header::CONTENT_TYPE])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(user_service.clone())
            .app_data(basic_info_service.clone())
            .app_data(friend_service.clone())
            .app_data(activity_service.clone())
            .app_data(prompt_service.clone())
            .app_data(saved_message_service.clone())
            .app_data(report_service.clone())
            .app_data(ws_server.clone())
            .service(health_check)
            .route("/ws", web::get().to(websocket_handler))
            .service(
                web::scope("/api")
                    .configure(modules::user::route::public_api_configure)
                    .service(
                        web::scope("/admin")
                            .wrap(from_fn(authorization(vec![UserRole::Admin])))
                            .wrap(from_fn(authentication))
                            .configure(modules::prompt::route::admin_configure)
                            .configure(modules::report::route::admin_configure),
                    )
                    .service(
                        web::scope("")
                            .wrap(from_fn(authorization(vec![UserRole::User, UserRole::Admin])))
                            .wrap(from_fn(authentication))
                            .configure(modules::user::route::configure)
                            .configure(modules::basic_info::route::configure)
                            .configure(modules::friend::route::configure)
                            .configure(modules::prompt::route::configure)
                            .configure(modules::activity::route::configure)
                            .configure(modules::saved_message::route::configure)
                            .configure(modules::report::route::configure),
                    ),
            )
    })
    .bind((ENV.ip.as_str(), ENV.port))?
    .workers(2)
    .run()
    .await
}
