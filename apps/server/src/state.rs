//! Shared application state

use crate::{
    auth::AuthManager,
    config::{Config, DatabaseBackend},
    db::{InMemoryPatientStore, PatientStore, PostgresPatientStore},
    services::PatientService,
    Result,
};
use sqlx::PgPool;
use std::sync::Arc;

/// Shared application state passed to all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub auth: Arc<AuthManager>,
    pub store: Arc<dyn PatientStore>,
    pub patient_service: Arc<PatientService>,
}

impl AppState {
    /// Initialize the application state with the store selected by `database.backend`
    pub async fn new(config: Config) -> Result<Self> {
        tracing::info!("Initializing application state...");

        let store: Arc<dyn PatientStore> = match config.database.backend {
            DatabaseBackend::Postgres => {
                let db_pool = create_db_pool(&config).await?;

                if config.database.run_migrations {
                    tracing::info!("Running database migrations...");
                    sqlx::migrate!("./migrations")
                        .run(&db_pool)
                        .await
                        .map_err(|e| crate::Error::Internal(format!("Migration failed: {}", e)))?;
                }

                Arc::new(PostgresPatientStore::new(db_pool))
            }
            DatabaseBackend::Memory => {
                tracing::warn!("Using in-memory patient store; data is lost on restart");
                Arc::new(InMemoryPatientStore::new())
            }
        };

        Self::with_store(config, store)
    }

    /// Build the state around an existing store (tests, embedding).
    pub fn with_store(config: Config, store: Arc<dyn PatientStore>) -> Result<Self> {
        let auth = Arc::new(AuthManager::from_config(&config.auth)?);
        let patient_service = Arc::new(PatientService::new(store.clone()));

        Ok(Self {
            config: Arc::new(config),
            auth,
            store,
            patient_service,
        })
    }
}

async fn create_db_pool(config: &Config) -> Result<PgPool> {
    tracing::info!("Creating database connection pool...");

    let statement_timeout = config.database.statement_timeout_seconds;
    let lock_timeout = config.database.lock_timeout_seconds;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .min_connections(config.database.pool_min_size)
        .max_connections(config.database.pool_max_size)
        .acquire_timeout(std::time::Duration::from_secs(
            config.database.pool_timeout_seconds,
        ))
        .after_connect(move |conn, _meta| {
            Box::pin(async move {
                // Set statement timeout (max query execution time)
                sqlx::query(&format!("SET statement_timeout = '{}s'", statement_timeout))
                    .execute(&mut *conn)
                    .await?;

                // Row locks taken by updates fail fast instead of queueing
                sqlx::query(&format!("SET lock_timeout = '{}s'", lock_timeout))
                    .execute(&mut *conn)
                    .await?;

                Ok(())
            })
        })
        .connect(&config.database.url)
        .await
        .map_err(crate::Error::Database)?;

    tracing::info!(
        "Database pool created (min: {}, max: {})",
        config.database.pool_min_size,
        config.database.pool_max_size
    );

    Ok(pool)
}
