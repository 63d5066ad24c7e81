// PostgreSQL backend for the transactional executor.
//
// With the `postgres` feature enabled this wires deadpool-postgres pools and
// tokio-postgres clients into the provider/executor traits:
// - config: DatabaseConfig validation and pool creation
// - params: RowValues -> tokio-postgres parameter conversion
// - query: result set building from driver rows
// - provider: ConnectionProvider / StatementExecutor implementations
//
// Without the feature, `PostgresDatabase` still constructs but is permanently
// unavailable.

#[cfg(feature = "postgres")]
pub mod config;
#[cfg(feature = "postgres")]
pub mod params;
#[cfg(feature = "postgres")]
pub mod provider;
#[cfg(feature = "postgres")]
pub mod query;

#[cfg(feature = "postgres")]
pub use params::Params;
#[cfg(feature = "postgres")]
pub use provider::PostgresPool;
#[cfg(feature = "postgres")]
pub use query::build_result_set;

use crate::config::DatabaseConfig;
use crate::error::SqlMiddlewareDbError;
use crate::executor::TransactionalExecutor;

/// Transactional executor backed by a PostgreSQL pool.
#[cfg(feature = "postgres")]
pub type PostgresDatabase = TransactionalExecutor<PostgresPool>;

/// Transactional executor for builds without the PostgreSQL driver.
#[cfg(not(feature = "postgres"))]
pub type PostgresDatabase = TransactionalExecutor<MissingPostgresDriver>;

#[cfg(feature = "postgres")]
impl TransactionalExecutor<PostgresPool> {
    /// Build a pooled PostgreSQL executor from explicit configuration.
    ///
    /// # Errors
    /// Returns `SqlMiddlewareDbError::ConfigError` if required config fields are missing
    /// or `SqlMiddlewareDbError::ConnectionError` if pool creation fails.
    pub fn from_config(config: &DatabaseConfig) -> Result<Self, SqlMiddlewareDbError> {
        let pool = PostgresPool::from_config(config)?;
        Ok(Self::with_retry_policy(pool, config.retry))
    }
}

/// Stand-in provider for builds compiled without the `postgres` feature. It has no
/// values, so a database using it can only be in the unavailable state.
#[cfg(not(feature = "postgres"))]
#[derive(Debug, Clone, Copy)]
pub enum MissingPostgresDriver {}

#[cfg(not(feature = "postgres"))]
#[derive(Debug)]
pub enum MissingPostgresHandle {}

#[cfg(not(feature = "postgres"))]
#[async_trait::async_trait]
impl crate::driver::StatementExecutor for MissingPostgresHandle {
    async fn run(
        &mut self,
        _statement: &str,
        _params: &[crate::types::RowValues],
    ) -> Result<crate::results::ResultSet, SqlMiddlewareDbError> {
        match *self {}
    }
}

#[cfg(not(feature = "postgres"))]
#[async_trait::async_trait]
impl crate::driver::ConnectionProvider for MissingPostgresDriver {
    type Handle = MissingPostgresHandle;

    const NAME: &'static str = "postgres";

    async fn acquire(&self) -> Result<Self::Handle, SqlMiddlewareDbError> {
        match *self {}
    }
}

#[cfg(not(feature = "postgres"))]
impl TransactionalExecutor<MissingPostgresDriver> {
    /// Construct without a driver. Always succeeds; every query or transaction then
    /// fails with `SqlMiddlewareDbError::DriverUnavailable`.
    ///
    /// # Errors
    /// Never; the `Result` matches the driver-enabled signature.
    pub fn from_config(config: &DatabaseConfig) -> Result<Self, SqlMiddlewareDbError> {
        tracing::warn!("pg-tx-middleware built without the `postgres` feature; database is unavailable");
        Ok(Self::from_driver(
            crate::driver::Driver::Unavailable,
            config.retry,
        ))
    }
}
