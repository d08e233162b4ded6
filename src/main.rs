mod api;
mod commands;
mod config;
mod error;
mod handlers;
mod i18n;
mod models;
mod notify;
mod router;
mod session;
mod tasks;

use api::{ApiClient, HttpTransport};
use commands::shell::{self, Shell};
use config::Config;
use log::{error, info};
use notify::Notifier;
use session::{AdminSession, FileTokenStore};
use std::sync::Arc;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize logging
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return;
        }
    };
    let api = ApiClient::new(Arc::new(HttpTransport::new(&config.api_base_url)), config.auth_scheme);
    info!("Using backend {} ({} auth)", config.api_base_url, api.auth_scheme());
    let session = AdminSession::new(Arc::new(FileTokenStore::new(config.session_file.clone())));
    let shell = Shell::new(api, session, Notifier::new(), config.language);

    if let Err(why) = shell::run(shell, "/").await {
        error!("Shell error: {}", why);
    }
}
