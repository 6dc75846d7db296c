use anyhow::{Context, Result};
use chat_translator::config::Config;
use chat_translator::credentials::{CredentialResolver, CredentialStore};
use chat_translator::dispatcher::Dispatcher;
use chat_translator::metrics::TranslationMetrics;
use chat_translator::server::{self, AppState};
use chat_translator::settings::SettingsStore;
use chat_translator::translation::Provider;
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("chat_translator=info".parse()?),
        )
        .init();

    info!("Starting chat translator");

    let config = Arc::new(Config::from_env()?);

    let provider = Provider::from_name(&config.translation_api);
    if provider.is_supported() {
        info!("Translating with {}", provider.name());
    } else {
        warn!(
            "Unsupported translation_api: '{}', chat will be delivered untranslated",
            provider.name()
        );
    }

    let store = CredentialStore::load(&config.player_keys_file)?;
    let credentials = CredentialResolver::new(&config, store);
    info!("Credential mode: {:?}", credentials.mode());

    let settings = SettingsStore::new(config.translation_enabled_by_default);
    let metrics = Arc::new(TranslationMetrics::new());
    let dispatcher = Dispatcher::new(config.clone(), settings, credentials, metrics.clone())?;

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    if config.api_key.is_none() {
        warn!("API_KEY is not set, the API accepts unauthenticated requests");
    }

    server::serve(listener, AppState::new(dispatcher, metrics, config.api_key.clone())).await
}
