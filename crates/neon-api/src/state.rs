//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by both the CLI and
//! the REST API. The engine and catalog are generic over repository traits;
//! AppState pins them to the SQLite implementations.

use std::path::PathBuf;
use std::sync::Arc;

use neon_core::conversation::catalog::ConversationCatalog;
use neon_core::engine::ConversationEngine;
use neon_core::event::EventBus;
use neon_core::generation::box_provider::BoxGenerationProvider;
use neon_infra::config::load_global_config;
use neon_infra::filesystem::ensure_data_dir;
use neon_infra::generation::create_provider;
use neon_infra::sqlite::conversation::SqliteConversationRepository;
use neon_infra::sqlite::pool::{DatabasePool, database_url};
use neon_types::config::GlobalConfig;

pub type ConcreteEngine =
    ConversationEngine<SqliteConversationRepository, SqliteConversationRepository>;

pub type ConcreteCatalog = ConversationCatalog<SqliteConversationRepository>;

/// Shared application state holding all services.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ConcreteEngine>,
    pub catalog: Arc<ConcreteCatalog>,
    pub events: EventBus,
    pub config: Arc<GlobalConfig>,
    pub data_dir: PathBuf,
    pub db_pool: DatabasePool,
}

impl AppState {
    /// Resolve the data dir, load config, open the database, and build the
    /// configured generation provider.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = ensure_data_dir().await?;
        let config = load_global_config(&data_dir).await;
        let db_pool = DatabasePool::new(&database_url(&data_dir)).await?;
        let provider = create_provider(&config.generation)?;

        tracing::debug!(
            data_dir = %data_dir.display(),
            provider = provider.name(),
            "Application state initialized"
        );

        Ok(Self::assemble(data_dir, config, db_pool, provider))
    }

    /// Wire services over an open pool and a ready provider.
    pub fn assemble(
        data_dir: PathBuf,
        config: GlobalConfig,
        db_pool: DatabasePool,
        provider: BoxGenerationProvider,
    ) -> Self {
        let events = EventBus::new(config.events.capacity);
        let repo = SqliteConversationRepository::new(db_pool.clone());

        let engine = ConversationEngine::new(
            repo.clone(),
            repo.clone(),
            Arc::new(provider),
            events.clone(),
        );
        let catalog = ConversationCatalog::new(repo, events.clone());

        Self {
            engine: Arc::new(engine),
            catalog: Arc::new(catalog),
            events,
            config: Arc::new(config),
            data_dir,
            db_pool,
        }
    }
}
