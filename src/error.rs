//! Custom error types for sdgcount

use thiserror::Error;

/// Main error type for sdgcount operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Keyword directory not found: {0}")]
    KeywordDir(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The database could not be reached or the session was lost
    #[error("Database connection error: {0}")]
    Connection(#[source] sqlx::Error),

    /// A statement was rejected or failed while executing
    #[error("Database query error: {0}")]
    Query(#[source] sqlx::Error),

    /// A statement violated a table constraint
    #[error("Database constraint violation: {0}")]
    Constraint(#[source] sqlx::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl Error {
    /// Whether the error came from the database driver
    pub fn is_database(&self) -> bool {
        matches!(
            self,
            Error::Connection(_) | Error::Query(_) | Error::Constraint(_)
        )
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        let is_constraint = match &err {
            sqlx::Error::Database(db) => {
                db.constraint().is_some()
                    || !matches!(db.kind(), sqlx::error::ErrorKind::Other)
            }
            _ => false,
        };

        let is_connection = matches!(
            err,
            sqlx::Error::Io(_)
                | sqlx::Error::Tls(_)
                | sqlx::Error::Configuration(_)
                | sqlx::Error::PoolTimedOut
                | sqlx::Error::PoolClosed
        );

        if is_constraint {
            Error::Constraint(err)
        } else if is_connection {
            Error::Connection(err)
        } else {
            Error::Query(err)
        }
    }
}

/// Result type alias for sdgcount
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_failures_are_connection_errors() {
        let err: Error = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, Error::Connection(_)));
        assert!(err.is_database());

        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err: Error = sqlx::Error::Io(io).into();
        assert!(matches!(err, Error::Connection(_)));
    }

    #[test]
    fn test_other_driver_errors_are_query_errors() {
        let err: Error = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, Error::Query(_)));

        let err: Error = sqlx::Error::ColumnNotFound("abstract".to_string()).into();
        assert!(matches!(err, Error::Query(_)));
    }

    #[test]
    fn test_non_database_errors() {
        let err = Error::KeywordDir("/missing".to_string());
        assert!(!err.is_database());
        assert_eq!(err.to_string(), "Keyword directory not found: /missing");
    }
}
