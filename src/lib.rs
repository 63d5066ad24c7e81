//! Async query, transaction, and streaming helpers over PostgreSQL.
//!
//! The heart of the crate is [`TransactionalExecutor`]: it runs a unit of work inside
//! `BEGIN`/`COMMIT`/`ROLLBACK` and transparently retries it when the store reports a
//! serialization conflict (`40001`, up to ten retries by default) or, once, a unique
//! violation (`23505`) that may really be a conflict.
//!
//! The driver is optional. When the crate is built without the `postgres` feature,
//! [`PostgresDatabase::from_config`] still succeeds, and every operation then fails with
//! [`SqlMiddlewareDbError::DriverUnavailable`].

pub mod config;
pub mod driver;
pub mod error;
pub mod executor;
pub mod postgres;
pub mod prelude;
pub mod results;
pub mod types;

#[cfg(feature = "test-utils")]
pub mod test_utils;

pub use config::{DEFAULT_MAX_CONFLICT_RETRIES, DatabaseConfig, RetryPolicy};
pub use driver::{ConnectionProvider, Driver, StatementExecutor};
pub use error::{ErrorClass, SqlMiddlewareDbError};
pub use executor::TransactionalExecutor;
pub use postgres::PostgresDatabase;
pub use results::{CustomDbRow, ResultSet};
pub use types::RowValues;
