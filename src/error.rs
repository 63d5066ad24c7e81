use thiserror::Error;

#[cfg(feature = "postgres")]
use deadpool_postgres::PoolError;

/// SQLSTATE reported by the store when two concurrent transactions conflict.
pub const SQLSTATE_SERIALIZATION_FAILURE: &str = "40001";
/// SQLSTATE reported for duplicate keys; PostgreSQL occasionally reports serialization
/// failures under this code.
pub const SQLSTATE_UNIQUE_VIOLATION: &str = "23505";

#[derive(Debug, Error)]
pub enum SqlMiddlewareDbError {
    /// Driver failure without a server-reported SQLSTATE (I/O, protocol, decoding).
    #[cfg(feature = "postgres")]
    #[error("{}", postgres_message(.0))]
    PostgresError(tokio_postgres::Error),

    #[cfg(feature = "postgres")]
    #[error(transparent)]
    PoolErrorPostgres(PoolError),

    /// A statement failed with a store-reported SQLSTATE.
    #[error("{message}")]
    StatementError { code: String, message: String },

    #[error("{0} driver not available")]
    DriverUnavailable(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Parameter conversion error: {0}")]
    ParameterError(String),

    #[error("SQL execution error: {0}")]
    ExecutionError(String),

    #[error("Other database error: {0}")]
    Other(String),
}

/// tokio-postgres renders server errors as "db error"; the server text lives in the source.
#[cfg(feature = "postgres")]
fn postgres_message(e: &tokio_postgres::Error) -> String {
    e.as_db_error()
        .map_or_else(|| e.to_string(), |db| db.message().to_string())
}

/// Server-reported errors become `StatementError` so their SQLSTATE and message survive.
#[cfg(feature = "postgres")]
impl From<tokio_postgres::Error> for SqlMiddlewareDbError {
    fn from(e: tokio_postgres::Error) -> Self {
        match e.as_db_error() {
            Some(db) => SqlMiddlewareDbError::statement(db.code().code(), db.message()),
            None => SqlMiddlewareDbError::PostgresError(e),
        }
    }
}

#[cfg(feature = "postgres")]
impl From<PoolError> for SqlMiddlewareDbError {
    fn from(e: PoolError) -> Self {
        match e {
            PoolError::Backend(inner) if inner.as_db_error().is_some() => {
                SqlMiddlewareDbError::ConnectionError(postgres_message(&inner))
            }
            other => SqlMiddlewareDbError::PoolErrorPostgres(other),
        }
    }
}

/// Classification of a failure, used to decide whether a transaction is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// Concurrent transactions were incompatible under the isolation level in use.
    SerializationConflict,
    /// Duplicate-key error that may be a mis-reported serialization conflict.
    SpuriousUniqueViolation,
    Other,
}

impl ErrorClass {
    /// Map a SQLSTATE code to its retry classification.
    #[must_use]
    pub fn from_sqlstate(code: &str) -> Self {
        match code {
            SQLSTATE_SERIALIZATION_FAILURE => ErrorClass::SerializationConflict,
            SQLSTATE_UNIQUE_VIOLATION => ErrorClass::SpuriousUniqueViolation,
            _ => ErrorClass::Other,
        }
    }
}

impl SqlMiddlewareDbError {
    /// Build a statement error carrying a SQLSTATE code.
    pub fn statement(code: impl Into<String>, message: impl Into<String>) -> Self {
        SqlMiddlewareDbError::StatementError {
            code: code.into(),
            message: message.into(),
        }
    }

    /// The SQLSTATE attached to this error, if the store reported one.
    #[must_use]
    pub fn sqlstate(&self) -> Option<&str> {
        match self {
            #[cfg(feature = "postgres")]
            SqlMiddlewareDbError::PostgresError(e) => e.code().map(|state| state.code()),
            SqlMiddlewareDbError::StatementError { code, .. } => Some(code.as_str()),
            _ => None,
        }
    }

    #[must_use]
    pub fn class(&self) -> ErrorClass {
        self.sqlstate()
            .map_or(ErrorClass::Other, ErrorClass::from_sqlstate)
    }
}
