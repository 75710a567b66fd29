use std::sync::Arc;

use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use anyhow::Context;

use roster::auth::password::hash_password;
use roster::config::Config;
use roster::db::{ensure_schema, init_db};
use roster::docs::ApiDoc;
use roster::routes;
use roster::store::{EmployeeStore, MemoryEmployeeStore, MySqlEmployeeStore};
use tracing::{info, warn};
use tracing_appender::rolling;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // `roster hash-passcode <passcode>` prints a value for ACCESS_PASSCODE_HASH
    let args: Vec<String> = std::env::args().collect();
    if args.get(1).map(String::as_str) == Some("hash-passcode") {
        let passcode = args.get(2).context("usage: roster hash-passcode <passcode>")?;
        let hash = hash_password(passcode).map_err(|e| anyhow::anyhow!("{}", e))?;
        println!("{}", hash);
        return Ok(());
    }

    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "roster.log");
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

    let store: Arc<dyn EmployeeStore> = match &config.database_url {
        Some(url) => {
            let pool = init_db(url)
                .await
                .context("Failed to connect to database")?;
            ensure_schema(&pool)
                .await
                .context("Failed to prepare employees table")?;
            info!("Using MySQL record store");
            Arc::new(MySqlEmployeeStore::new(pool))
        }
        None => {
            warn!("DATABASE_URL not set, records are kept in memory only");
            Arc::new(MemoryEmployeeStore::new())
        }
    };

    if config.access.is_none() {
        warn!("ACCESS_PASSCODE_HASH not set, employee routes are open");
    }

    let limiter = routes::access_limiter(config.rate_access_per_min)?;
    let store = Data::from(store);
    let server_addr = config.server_addr.clone();

    info!(addr = %server_addr, "Listening");

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(store.clone())
            .app_data(Data::new(config.clone()))
            .configure(|cfg| routes::configure(cfg, &config, &limiter))
    })
    .bind(&server_addr)?
    .run()
    .await?;

    Ok(())
}
