//! # BBS Binary
//!
//! The entry point that assembles the application based on compile-time features.

use actix_web::{web, App, HttpServer};
use bbs_api::handlers::AppState;
use bbs_api::middleware::{cors_policy, standard_middleware};
use bbs_config::Settings;
use bbs_core::pagination::PagePolicy;

#[cfg(feature = "db-sqlite")]
use bbs_db_sqlite::SqliteBbsRepo;

#[cfg(not(feature = "db-sqlite"))]
compile_error!("bbs needs a storage plugin; enable the `db-sqlite` feature");

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load()?;
    env_logger::init_from_env(env_logger::Env::new().default_filter_or(settings.log_level.as_str()));

    // 1. Initialize Database Implementation
    #[cfg(feature = "db-sqlite")]
    let repo = SqliteBbsRepo::new(&settings.database.url).await?;

    // 2. Wrap in AppState (Using dynamic dispatch for maximum flexibility)
    let state = web::Data::new(AppState {
        users: Box::new(repo.clone()),
        posts: Box::new(repo),
        paging: PagePolicy {
            default_size: settings.pagination.default_size,
            max_size: settings.pagination.max_size,
        },
    });

    let (host, port) = settings.bind_addr();
    log::info!("BBS starting on http://{host}:{port}");

    HttpServer::new(move || {
        App::new()
            .wrap(cors_policy())
            .wrap(standard_middleware())
            .app_data(state.clone())
            .configure(bbs_api::configure_routes)
    })
    .bind((host, port))?
    .run()
    .await?;

    Ok(())
}
