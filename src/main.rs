use anyhow::Result;
use log::{info, warn};
use satgas_patrol::api::rest::{AppState, RestApi};
use satgas_patrol::config::{self, StorageBackend};
use satgas_patrol::db::repositories::Stores;
use satgas_patrol::db::DatabaseService;
use satgas_patrol::services::Calendar;
use std::env;
use std::path::PathBuf;

async fn run_app() -> Result<()> {
    // Config path from the first argument, then SATGAS_CONFIG
    let config_path = env::args()
        .nth(1)
        .or_else(|| env::var("SATGAS_CONFIG").ok())
        .map(PathBuf::from);
    let config = config::load_config(config_path.as_deref())?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.api.log_level.as_str()),
    )
    .init();
    info!("Starting satgas patrol backend");

    let calendar = Calendar::from_config(&config.time)?;
    info!("Calendar running at UTC{}", calendar.offset());

    let (stores, database) = match config.database.backend {
        StorageBackend::Postgres => {
            let database = DatabaseService::new(&config.database).await?;
            (Stores::postgres(database.pool.clone()), Some(database))
        }
        StorageBackend::Memory => {
            warn!("Using in-memory storage; records are lost on exit");
            (Stores::memory(), None)
        }
    };

    let mut state = AppState::new(&stores, &config, calendar);
    if let Some(database) = database {
        state = state.with_database(database);
    }

    if let (Some(email), Some(password)) = (
        config.security.bootstrap_admin_email.as_deref(),
        config.security.bootstrap_admin_password.as_deref(),
    ) {
        if let Some(admin) = state.auth.ensure_bootstrap_admin(email, password).await? {
            info!("Bootstrap admin ready: {}", admin.email);
        }
    }

    tokio::fs::create_dir_all(state.media.root()).await?;
    info!("Serving media from {:?}", state.media.root());

    RestApi::new(&config, state).run().await?;

    info!("Shutdown complete");
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(e) = run_app().await {
        eprintln!("Application error: {:#}", e);
        std::process::exit(1);
    }
}
