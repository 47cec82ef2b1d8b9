use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use freightbot_core::config::{AppConfig, ConfigError, LoadOptions};
use freightbot_core::engine::{ConversationEngine, EngineBranding};
use freightbot_core::session::SessionStore;
use freightbot_core::RenderError;
use freightbot_db::{connect, migrations, DbPool, SqlLeadStore};
use freightbot_whatsapp::WhatsAppClient;

use crate::pdf::QuoteDocumentRenderer;
use crate::registry::HttpRegistryLookup;
use crate::routes::{AppState, Engine};

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub engine: Arc<Engine>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("document renderer setup failed: {0}")]
    Renderer(#[source] RenderError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(event_name = "bootstrap.start", "starting application bootstrap");

    let db_pool = connect(&config.database).await.map_err(BootstrapError::DatabaseConnect)?;
    info!(event_name = "bootstrap.database_connected", "database connection established");

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(event_name = "bootstrap.migrations_applied", "database migrations applied");

    let public_base_url = config.server.public_base_url.clone().unwrap_or_else(|| {
        format!("http://{}:{}", config.server.bind_address, config.server.port)
    });

    let channel = Arc::new(WhatsAppClient::new(
        config.whatsapp.graph_base_url.clone(),
        config.whatsapp.phone_number_id.clone(),
        config.whatsapp.api_token.clone(),
        config.server.public_dir.clone(),
        public_base_url,
    ));
    let renderer = Arc::new(
        QuoteDocumentRenderer::new(
            None,
            config.server.public_dir.clone(),
            config.branding.clone(),
        )
        .map_err(BootstrapError::Renderer)?,
    );
    let leads = Arc::new(SqlLeadStore::new(db_pool.clone()));
    let registry = Arc::new(HttpRegistryLookup::new(config.registry.lookup_url.clone()));

    let engine = Arc::new(ConversationEngine::new(
        Arc::new(SessionStore::new()),
        channel,
        renderer,
        leads,
        registry,
        EngineBranding {
            company_name: config.branding.company_name.clone(),
            logo_url: config.branding.logo_url.clone(),
        },
    ));

    info!(
        event_name = "bootstrap.complete",
        registry_enabled = config.registry.lookup_url.is_some(),
        "application bootstrap complete"
    );

    Ok(Application { config, db_pool, engine })
}

impl Application {
    pub fn app_state(&self) -> AppState {
        AppState {
            engine: self.engine.clone(),
            verify_token: self.config.whatsapp.verify_token.clone(),
        }
    }
}
