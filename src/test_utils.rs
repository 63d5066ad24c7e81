//! Embedded PostgreSQL for live tests (enabled with the `test-utils` feature).

use std::sync::LazyLock;

use postgresql_embedded::PostgreSQL;
use tokio::runtime::Runtime;

use crate::config::DatabaseConfig;

/// Shared tokio runtime for test utilities to avoid creating multiple runtimes
static SHARED_RUNTIME: LazyLock<Runtime> =
    LazyLock::new(|| Runtime::new().expect("Failed to create tokio runtime for test utilities"));

/// Represents a running embedded `PostgreSQL` instance.
pub struct EmbeddedPostgres {
    pub postgresql: PostgreSQL,
    pub port: u16,
    /// Configuration pointing at the running instance with working credentials
    pub config: DatabaseConfig,
}

/// Start an embedded `PostgreSQL` instance and create `dbname` in it.
///
/// # Errors
/// Returns an error if the embedded server cannot be set up or started, or if the
/// database cannot be created.
pub fn setup_postgres_embedded(
    dbname: &str,
) -> Result<EmbeddedPostgres, Box<dyn std::error::Error>> {
    SHARED_RUNTIME.block_on(async {
        let mut postgresql = PostgreSQL::default();
        postgresql.setup().await?;
        postgresql.start().await?;
        postgresql.create_database(dbname).await?;

        let settings = postgresql.settings();
        let port = settings.port;
        let config = DatabaseConfig {
            host: Some(settings.host.clone()),
            port: Some(port),
            dbname: Some(dbname.to_string()),
            user: Some(settings.username.clone()),
            password: Some(settings.password.clone()),
            ..DatabaseConfig::default()
        };
        tracing::debug!(port, dbname, "embedded postgres started");

        Ok(EmbeddedPostgres {
            postgresql,
            port,
            config,
        })
    })
}

/// Stop a previously started embedded `PostgreSQL` instance.
pub fn stop_postgres_embedded(postgres: EmbeddedPostgres) {
    let EmbeddedPostgres { postgresql, .. } = postgres;
    SHARED_RUNTIME.block_on(async move {
        let _ = postgresql.stop().await;
    });
}
