//! Create the first admin account in the configured Postgres database.
//!
//! Usage: `create-admin <email> [password]`. Without a password one is
//! generated and printed. Nothing happens when an admin already exists.

use anyhow::{bail, Result};
use log::info;
use satgas_patrol::config::{self, StorageBackend};
use satgas_patrol::db::repositories::Stores;
use satgas_patrol::db::DatabaseService;
use satgas_patrol::security::auth::AuthService;
use satgas_patrol::security::password;
use std::env;
use std::path::PathBuf;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = env::args().skip(1);
    let email = match args.next() {
        Some(email) => email,
        None => bail!("usage: create-admin <email> [password]"),
    };
    let (password, generated) = match args.next() {
        Some(password) => (password, false),
        None => (password::generate_random_password(16), true),
    };

    let config_path = env::var("SATGAS_CONFIG").ok().map(PathBuf::from);
    let config = config::load_config(config_path.as_deref())?;
    if config.database.backend != StorageBackend::Postgres {
        bail!("create-admin needs the postgres backend");
    }

    let database = DatabaseService::new(&config.database).await?;
    let stores = Stores::postgres(database.pool.clone());
    let auth = AuthService::new(stores.accounts, &config.security);

    match auth.ensure_bootstrap_admin(&email, &password).await? {
        Some(admin) => {
            info!("Admin account ready: {}", admin.email);
            if generated {
                println!("Generated password: {}", password);
            }
        }
        None => info!("An admin account already exists; nothing to do"),
    }

    Ok(())
}
