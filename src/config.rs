use serde::{Deserialize, Serialize};

/// Default number of times a transaction is retried after a serialization conflict.
pub const DEFAULT_MAX_CONFLICT_RETRIES: u32 = 10;

/// Bounds for retrying a transaction's unit of work.
///
/// Conflict retries and the unique-violation retry share one depth counter: a
/// serialization conflict is retried while `depth < max_conflict_retries`, a unique
/// violation only when it is the first failure (`depth == 0`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub max_conflict_retries: u32,
    pub retry_unique_violation: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_conflict_retries: DEFAULT_MAX_CONFLICT_RETRIES,
            retry_unique_violation: true,
        }
    }
}

impl RetryPolicy {
    /// Policy that never retries.
    #[must_use]
    pub fn no_retries() -> Self {
        Self {
            max_conflict_retries: 0,
            retry_unique_violation: false,
        }
    }

    #[must_use]
    pub fn with_max_conflict_retries(mut self, max_conflict_retries: u32) -> Self {
        self.max_conflict_retries = max_conflict_retries;
        self
    }
}

/// Connection settings handed to the database at construction time.
///
/// Nothing is read from the environment; callers deserialize this from their own
/// configuration source or build it directly.
///
/// ```rust
/// use pg_tx_middleware::DatabaseConfig;
///
/// let cfg: DatabaseConfig = serde_json::from_str(
///     r#"{"host": "localhost", "dbname": "app", "user": "app", "password": "secret"}"#,
/// ).unwrap();
/// assert_eq!(cfg.port, Some(5432));
/// assert_eq!(cfg.retry.max_conflict_retries, 10);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub dbname: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    /// Maximum pooled connections; the driver default applies when unset.
    pub pool_max_size: Option<usize>,
    pub retry: RetryPolicy,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: Some(5432),
            dbname: None,
            user: None,
            password: None,
            pool_max_size: None,
            retry: RetryPolicy::default(),
        }
    }
}

impl DatabaseConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_partial_config_with_defaults() {
        let cfg: DatabaseConfig = serde_json::from_str(
            r#"{"host": "db", "dbname": "app", "retry": {"max_conflict_retries": 3}}"#,
        )
        .unwrap();
        assert_eq!(cfg.host.as_deref(), Some("db"));
        assert_eq!(cfg.port, Some(5432));
        assert_eq!(cfg.retry.max_conflict_retries, 3);
        assert!(cfg.retry.retry_unique_violation);
    }

    #[test]
    fn no_retries_policy() {
        let policy = RetryPolicy::no_retries();
        assert_eq!(policy.max_conflict_retries, 0);
        assert!(!policy.retry_unique_violation);
    }
}
