use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use std::time::Duration;

use hrportal::config::Config;
use hrportal::db::init_db;
use hrportal::docs::openapi_for;
use hrportal::routes;
use hrportal::utils::directory_cache::{self, DirectoryCache};

use tracing::{info, warn};
use tracing_appender::rolling;
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "HR Portal"
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(config.log_level)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let pool = init_db(&config.database_url).await?;
    let directory = DirectoryCache::new(Duration::from_secs(config.directory_cache_ttl_secs));

    let pool_for_warmup = pool.clone();
    let directory_for_warmup = directory.clone();
    let server_addr = config.server_addr.clone();
    let config_data = config.clone();
    let openapi = openapi_for(&config.api_prefix);

    actix_web::rt::spawn(async move {
        if let Err(e) =
            directory_cache::warmup_directory_cache(&directory_for_warmup, &pool_for_warmup).await
        {
            warn!(error = %e, "Failed to warm up directory cache");
        }
    });

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", openapi.clone()),
            )
            .app_data(Data::new(pool.clone()))
            .app_data(Data::new(config.clone()))
            .app_data(Data::new(directory.clone()))
            .service(index)
            .configure(|cfg| routes::configure(cfg, config_data.clone()))
    })
    .bind(server_addr)?
    .run()
    .await?;

    Ok(())
}
