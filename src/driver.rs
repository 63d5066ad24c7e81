//! Collaborator seams: a provider that hands out attempt-scoped handles, and the
//! statement execution those handles support.

use async_trait::async_trait;

use crate::error::SqlMiddlewareDbError;
use crate::results::ResultSet;
use crate::types::RowValues;

/// Runs statements against a live handle.
///
/// Driver failures must keep their SQLSTATE (see [`SqlMiddlewareDbError::sqlstate`]) so
/// the transaction loop can classify them.
#[async_trait]
pub trait StatementExecutor: Send {
    /// Run a statement with positional parameters and return its rows in order.
    ///
    /// # Errors
    /// Returns the driver's error for the failed statement.
    async fn run(
        &mut self,
        statement: &str,
        params: &[RowValues],
    ) -> Result<ResultSet, SqlMiddlewareDbError>;

    /// Run parameterless SQL such as `BEGIN`, `COMMIT`, or `ROLLBACK`.
    ///
    /// # Errors
    /// Returns the driver's error for the failed statement.
    async fn execute_batch(&mut self, sql: &str) -> Result<(), SqlMiddlewareDbError> {
        self.run(sql, &[]).await.map(|_| ())
    }
}

/// Source of transactional handles (normally a connection pool).
#[async_trait]
pub trait ConnectionProvider: Send + Sync {
    type Handle: StatementExecutor + Send;

    /// Backend name used in diagnostics.
    const NAME: &'static str;

    /// Acquire a handle, waiting while the pool is exhausted.
    ///
    /// # Errors
    /// Returns a connection or pool error; callers treat it as fatal.
    async fn acquire(&self) -> Result<Self::Handle, SqlMiddlewareDbError>;

    /// Return a handle obtained from [`ConnectionProvider::acquire`].
    ///
    /// Taking the handle by value means it can only be released once. The default drops
    /// it, which is how pooled connections go back to their pool.
    async fn release(&self, handle: Self::Handle) {
        drop(handle);
    }
}

/// Whether a usable client exists, resolved once when the database is constructed.
#[derive(Debug, Clone)]
pub enum Driver<P> {
    Available(P),
    Unavailable,
}

impl<P> Driver<P> {
    #[must_use]
    pub fn is_available(&self) -> bool {
        matches!(self, Driver::Available(_))
    }

    #[must_use]
    pub fn provider(&self) -> Option<&P> {
        match self {
            Driver::Available(provider) => Some(provider),
            Driver::Unavailable => None,
        }
    }
}

impl<P> From<Option<P>> for Driver<P> {
    fn from(provider: Option<P>) -> Self {
        provider.map_or(Driver::Unavailable, Driver::Available)
    }
}
