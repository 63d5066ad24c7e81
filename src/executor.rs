mod retry;
mod stream;

use futures_util::future::BoxFuture;
use tracing::{debug, warn};

use crate::config::RetryPolicy;
use crate::driver::{ConnectionProvider, Driver, StatementExecutor};
use crate::error::SqlMiddlewareDbError;
use crate::results::ResultSet;
use crate::types::RowValues;

/// Runs units of work inside a `BEGIN`/`COMMIT`/`ROLLBACK` envelope, retrying them when
/// the store reports a serialization conflict or a spurious unique violation.
///
/// The executor holds no mutable state; concurrent callers each get their own handle
/// from the provider.
#[derive(Debug, Clone)]
pub struct TransactionalExecutor<P> {
    driver: Driver<P>,
    retry: RetryPolicy,
}

/// How one attempt ended, when it did not commit.
enum AttemptError {
    /// Acquire, `BEGIN`, or `COMMIT` failed; never retried.
    Fatal(SqlMiddlewareDbError),
    /// The unit of work failed and the transaction was rolled back.
    UnitOfWork(SqlMiddlewareDbError),
}

impl<P: ConnectionProvider> TransactionalExecutor<P> {
    /// Executor over an available provider using the default retry policy.
    pub fn new(provider: P) -> Self {
        Self::with_retry_policy(provider, RetryPolicy::default())
    }

    pub fn with_retry_policy(provider: P, retry: RetryPolicy) -> Self {
        Self {
            driver: Driver::Available(provider),
            retry,
        }
    }

    /// Executor without a usable client: every operation fails with
    /// [`SqlMiddlewareDbError::DriverUnavailable`].
    #[must_use]
    pub fn unavailable() -> Self {
        Self::from_driver(Driver::Unavailable, RetryPolicy::default())
    }

    pub fn from_driver(driver: Driver<P>, retry: RetryPolicy) -> Self {
        Self { driver, retry }
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        self.driver.is_available()
    }

    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    fn provider(&self) -> Result<&P, SqlMiddlewareDbError> {
        self.driver
            .provider()
            .ok_or_else(|| SqlMiddlewareDbError::DriverUnavailable(P::NAME.to_string()))
    }

    /// Run a single statement on a freshly acquired handle (auto-commit).
    ///
    /// # Errors
    /// Returns `DriverUnavailable` in degraded mode, or the acquire/statement error
    /// unchanged.
    pub async fn query(
        &self,
        statement: &str,
        params: &[RowValues],
    ) -> Result<ResultSet, SqlMiddlewareDbError> {
        let provider = self.provider()?;
        let mut handle = provider.acquire().await?;
        let result = handle.run(statement, params).await;
        provider.release(handle).await;
        result
    }

    /// Execute `unit_of_work` in a transaction, retrying it on conflicts.
    ///
    /// Each attempt acquires its own handle, issues `BEGIN`, runs the unit of work, and
    /// then issues `COMMIT` on success or `ROLLBACK` on failure before releasing the
    /// handle. A failed attempt is retried per [`RetryPolicy`]; otherwise the unit of
    /// work's error is returned unchanged.
    ///
    /// ```rust,no_run
    /// use pg_tx_middleware::prelude::*;
    ///
    /// # async fn demo(db: PostgresDatabase) -> Result<(), SqlMiddlewareDbError> {
    /// let balance = db
    ///     .transaction(|tx| {
    ///         Box::pin(async move {
    ///             tx.run(
    ///                 "UPDATE accounts SET balance = balance - $1 WHERE id = $2",
    ///                 &[RowValues::Int(10), RowValues::Int(1)],
    ///             )
    ///             .await?;
    ///             tx.run("SELECT balance FROM accounts WHERE id = $1", &[RowValues::Int(1)])
    ///                 .await
    ///         })
    ///     })
    ///     .await?;
    /// # let _ = balance;
    /// # Ok(()) }
    /// ```
    ///
    /// # Errors
    /// Returns `DriverUnavailable` in degraded mode, acquire/`BEGIN`/`COMMIT` errors
    /// as-is, and the last unit-of-work error once retries are exhausted.
    pub async fn transaction<T, F>(&self, unit_of_work: F) -> Result<T, SqlMiddlewareDbError>
    where
        F: for<'c> FnMut(&'c mut P::Handle) -> BoxFuture<'c, Result<T, SqlMiddlewareDbError>>,
    {
        self.transaction_with_policy(self.retry, unit_of_work).await
    }

    /// [`TransactionalExecutor::transaction`] with a retry policy for this call only.
    ///
    /// # Errors
    /// Same as [`TransactionalExecutor::transaction`].
    pub async fn transaction_with_policy<T, F>(
        &self,
        retry: RetryPolicy,
        mut unit_of_work: F,
    ) -> Result<T, SqlMiddlewareDbError>
    where
        F: for<'c> FnMut(&'c mut P::Handle) -> BoxFuture<'c, Result<T, SqlMiddlewareDbError>>,
    {
        let provider = self.provider()?;
        let mut depth: u32 = 0;
        loop {
            match attempt(provider, &mut unit_of_work).await {
                Ok(value) => return Ok(value),
                Err(AttemptError::Fatal(e)) => return Err(e),
                Err(AttemptError::UnitOfWork(e)) => {
                    let class = e.class();
                    if !retry.should_retry(depth, class) {
                        return Err(e);
                    }
                    depth += 1;
                    debug!(depth, ?class, error = %e, "retrying transaction");
                }
            }
        }
    }
}

async fn attempt<P, T, F>(provider: &P, unit_of_work: &mut F) -> Result<T, AttemptError>
where
    P: ConnectionProvider,
    F: for<'c> FnMut(&'c mut P::Handle) -> BoxFuture<'c, Result<T, SqlMiddlewareDbError>>,
{
    let mut handle = provider.acquire().await.map_err(AttemptError::Fatal)?;

    if let Err(e) = handle.execute_batch("BEGIN").await {
        provider.release(handle).await;
        return Err(AttemptError::Fatal(e));
    }

    match unit_of_work(&mut handle).await {
        Ok(value) => {
            let committed = handle.execute_batch("COMMIT").await;
            provider.release(handle).await;
            committed.map(|()| value).map_err(AttemptError::Fatal)
        }
        Err(e) => {
            if let Err(rollback_err) = handle.execute_batch("ROLLBACK").await {
                warn!(error = %rollback_err, "rollback failed after unit of work error");
            }
            provider.release(handle).await;
            Err(AttemptError::UnitOfWork(e))
        }
    }
}
