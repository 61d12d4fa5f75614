use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use std::sync::Arc;
use std::time::Duration;

mod api;
mod auth;
mod config;
mod db;
mod docs;
mod model;
mod models;
mod repository;
mod routes;
mod utils;
mod workflow;

use config::Config;
use db::init_db;

use crate::repository::RequestRepository;
use crate::repository::mysql::MySqlRequestRepository;
use crate::routes::RateLimiters;
use crate::utils::role_cache::{self, RoleDirectory};
use tracing::{info, warn};
use tracing_appender::rolling;
use utoipa_swagger_ui::SwaggerUi;

#[get("/health")]
async fn health() -> impl Responder {
    "OK"
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let pool = init_db(&config.database_url).await?;

    let store = Arc::new(MySqlRequestRepository::new(pool.clone()));
    let requests: Arc<dyn RequestRepository> = store.clone();
    let roles = Data::new(RoleDirectory::new(
        store,
        Duration::from_secs(config.role_cache_ttl_secs),
    ));
    let limiters = RateLimiters::new(&config)?;

    let roles_for_warmup = roles.clone();
    actix_web::rt::spawn(async move {
        if let Err(e) = role_cache::warmup_role_cache(&roles_for_warmup, &pool, 250).await {
            warn!(error = %e, "Failed to warmup approver role cache");
        }
    });

    let server_addr = config.server_addr.clone();
    let api_doc = docs::api_doc(&config.api_prefix);

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", api_doc.clone()),
            )
            .app_data(Data::from(requests.clone()))
            .app_data(roles.clone())
            .app_data(Data::new(config.clone()))
            .service(health)
            .configure(|cfg| routes::configure(cfg, &config, &limiters))
    })
    .bind(server_addr)?
    .run()
    .await?;

    Ok(())
}
