use std::sync::Arc;

use crate::bootstrap::config::{Config, DbConfig, StoreKind};
use crate::modules::catalog::{ContentStore, MemoryContentStore, SeaOrmContentStore};
use crate::modules::services::{DiscoveryService, ManagementService};
use errors::AppError;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, DatabaseConnection};
use tracing::info;

/// Services ready for a transport adapter to mount.
#[derive(Clone)]
pub struct CatalogServices {
    pub management: ManagementService,
    pub discovery: DiscoveryService,
    pub store: Arc<dyn ContentStore>,
}

/// Loads configuration from the environment and wires the services.
pub async fn run() -> Result<CatalogServices, AppError> {
    init_tracing();

    let config = Config::from_env()?;
    info!(store = ?config.store, "Configuration loaded. Initializing catalog...");

    bootstrap(&config).await
}

pub fn init_tracing() {
    // A subscriber may already be installed by the embedding process.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .try_init();
}

pub async fn bootstrap(config: &Config) -> Result<CatalogServices, AppError> {
    let store = build_store(config).await?;

    let services = CatalogServices {
        management: ManagementService::new(store.clone()),
        discovery: DiscoveryService::new(store.clone()),
        store,
    };

    info!("Catalog services initialized successfully");
    Ok(services)
}

pub async fn build_store(config: &Config) -> Result<Arc<dyn ContentStore>, AppError> {
    match config.store {
        StoreKind::Memory => {
            info!("Using in-memory content store");
            Ok(Arc::new(MemoryContentStore::new()))
        }
        StoreKind::Database => {
            let db_config = config.db.as_ref().ok_or_else(|| {
                AppError::Config("database store selected without DATABASE_URL".to_string())
            })?;
            let connection = setup_database(db_config).await?;
            Ok(Arc::new(SeaOrmContentStore::new(connection)))
        }
    }
}

pub async fn setup_database(db_config: &DbConfig) -> Result<DatabaseConnection, AppError> {
    info!("Setting up Database");

    let mut opt = ConnectOptions::new(&db_config.url);

    opt.max_connections(db_config.max_connections)
        .min_connections(db_config.min_connections)
        .connect_timeout(db_config.connect_timeout)
        .idle_timeout(db_config.idle_timeout)
        .max_lifetime(db_config.max_lifetime)
        .sqlx_logging(db_config.logging_enabled);

    let connection = sea_orm::Database::connect(opt)
        .await
        .map_err(|db_err| AppError::Storage(Box::new(db_err)))?;

    info!("Running database migrations...");
    Migrator::up(&connection, None)
        .await
        .map_err(|db_err| AppError::Migration(Box::new(db_err)))?;

    Ok(connection)
}
