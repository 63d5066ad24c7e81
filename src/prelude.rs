//! Convenient imports for common functionality.
//!
//! This module re-exports the most commonly used types and traits
//! to make it easier to get started with the library.

pub use crate::config::{DatabaseConfig, RetryPolicy};
pub use crate::driver::{ConnectionProvider, Driver, StatementExecutor};
pub use crate::error::{ErrorClass, SqlMiddlewareDbError};
pub use crate::executor::TransactionalExecutor;
pub use crate::postgres::PostgresDatabase;
pub use crate::results::{CustomDbRow, ResultSet};
pub use crate::types::RowValues;

#[cfg(feature = "postgres")]
pub use crate::postgres::{Params as PostgresParams, PostgresPool};
