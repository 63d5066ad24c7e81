use async_trait::async_trait;
use deadpool_postgres::{Object, Pool, Runtime};
use tokio_postgres::NoTls;

use super::params::Params;
use super::query::build_result_set;
use crate::config::DatabaseConfig;
use crate::driver::{ConnectionProvider, StatementExecutor};
use crate::error::SqlMiddlewareDbError;
use crate::results::ResultSet;
use crate::types::RowValues;

/// deadpool-postgres pool acting as the connection provider.
#[derive(Debug, Clone)]
pub struct PostgresPool {
    pool: Pool,
}

impl PostgresPool {
    /// Create the pool. No connection is opened until the first acquire.
    ///
    /// # Errors
    /// Returns `SqlMiddlewareDbError::ConfigError` if required config fields are missing
    /// or `SqlMiddlewareDbError::ConnectionError` if pool creation fails.
    pub fn from_config(config: &DatabaseConfig) -> Result<Self, SqlMiddlewareDbError> {
        let pg_config = config.to_pg_config()?;
        let pool = pg_config
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| {
                SqlMiddlewareDbError::ConnectionError(format!(
                    "Failed to create Postgres pool: {e}"
                ))
            })?;
        Ok(Self { pool })
    }

    #[must_use]
    pub fn from_pool(pool: Pool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &Pool {
        &self.pool
    }
}

#[async_trait]
impl ConnectionProvider for PostgresPool {
    type Handle = Object;

    const NAME: &'static str = "postgres";

    async fn acquire(&self) -> Result<Self::Handle, SqlMiddlewareDbError> {
        Ok(self.pool.get().await?)
    }
}

#[async_trait]
impl StatementExecutor for Object {
    async fn run(
        &mut self,
        statement: &str,
        params: &[RowValues],
    ) -> Result<ResultSet, SqlMiddlewareDbError> {
        let stmt = self.prepare_cached(statement).await?;
        let converted = Params::convert(params);
        if stmt.columns().is_empty() {
            // DML without RETURNING: only the command tag carries the row count.
            let affected = self.execute(&stmt, converted.as_refs()).await?;
            let rows_affected = usize::try_from(affected).map_err(|e| {
                SqlMiddlewareDbError::ExecutionError(format!(
                    "Invalid rows affected count: {e}"
                ))
            })?;
            return Ok(ResultSet::with_rows_affected(rows_affected));
        }
        let rows = self.query(&stmt, converted.as_refs()).await?;
        build_result_set(&stmt, &rows)
    }

    async fn execute_batch(&mut self, sql: &str) -> Result<(), SqlMiddlewareDbError> {
        self.batch_execute(sql).await?;
        Ok(())
    }
}
