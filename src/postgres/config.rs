use deadpool_postgres::{Config as PgConfig, PoolConfig};

use crate::config::DatabaseConfig;
use crate::error::SqlMiddlewareDbError;

impl DatabaseConfig {
    /// Translate into a deadpool-postgres config, checking required fields.
    ///
    /// # Errors
    /// Returns `SqlMiddlewareDbError::ConfigError` naming the first missing field.
    pub fn to_pg_config(&self) -> Result<PgConfig, SqlMiddlewareDbError> {
        // Validate all required config fields are present
        if self.dbname.is_none() {
            return Err(SqlMiddlewareDbError::ConfigError(
                "dbname is required".to_string(),
            ));
        }
        if self.host.is_none() {
            return Err(SqlMiddlewareDbError::ConfigError(
                "host is required".to_string(),
            ));
        }
        if self.port.is_none() {
            return Err(SqlMiddlewareDbError::ConfigError(
                "port is required".to_string(),
            ));
        }
        if self.user.is_none() {
            return Err(SqlMiddlewareDbError::ConfigError(
                "user is required".to_string(),
            ));
        }

        let mut pg_config = PgConfig::new();
        pg_config.host.clone_from(&self.host);
        pg_config.port = self.port;
        pg_config.dbname.clone_from(&self.dbname);
        pg_config.user.clone_from(&self.user);
        pg_config.password.clone_from(&self.password);
        if let Some(max_size) = self.pool_max_size {
            pg_config.pool = Some(PoolConfig::new(max_size));
        }
        Ok(pg_config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> DatabaseConfig {
        DatabaseConfig {
            host: Some("localhost".into()),
            dbname: Some("app".into()),
            user: Some("app".into()),
            password: Some("secret".into()),
            pool_max_size: Some(4),
            ..DatabaseConfig::default()
        }
    }

    #[test]
    fn copies_fields_into_pg_config() {
        let pg = complete().to_pg_config().unwrap();
        assert_eq!(pg.host.as_deref(), Some("localhost"));
        assert_eq!(pg.port, Some(5432));
        assert_eq!(pg.dbname.as_deref(), Some("app"));
        assert_eq!(pg.pool.map(|p| p.max_size), Some(4));
    }

    #[test]
    fn missing_dbname_is_a_config_error() {
        let cfg = DatabaseConfig {
            dbname: None,
            ..complete()
        };
        let err = cfg.to_pg_config().unwrap_err();
        assert!(matches!(err, SqlMiddlewareDbError::ConfigError(msg) if msg == "dbname is required"));
    }

    #[test]
    fn missing_user_is_a_config_error() {
        let cfg = DatabaseConfig {
            user: None,
            ..complete()
        };
        assert!(matches!(
            cfg.to_pg_config(),
            Err(SqlMiddlewareDbError::ConfigError(_))
        ));
    }
}
