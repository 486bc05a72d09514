//! Error types

use thiserror::Error;

/// Error type reported by the SQL Server driver
pub use tiberius::error::Error as DriverError;

use crate::db::Target;

/// Failures surfaced by connection-scoped operations.
///
/// Both variants carry the driver error untouched as their source.
#[derive(Error, Debug)]
pub enum Error {
    /// Opening (or releasing) a session failed: bad credentials, unreachable
    /// host, unknown database.
    #[error("connection to {server}/{database} failed")]
    Connection {
        server: String,
        database: String,
        #[source]
        source: DriverError,
    },

    /// The server rejected a submitted statement.
    #[error("statement rejected by server")]
    Statement(#[source] DriverError),
}

impl Error {
    pub fn connection(target: &Target, source: impl Into<DriverError>) -> Self {
        Error::Connection {
            server: target.server.clone(),
            database: target.database.clone(),
            source: source.into(),
        }
    }

    pub fn is_connection(&self) -> bool {
        matches!(self, Error::Connection { .. })
    }

    pub fn is_statement(&self) -> bool {
        matches!(self, Error::Statement(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_connection_error_keeps_driver_source() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = Error::connection(&Target::new("vdbedcisandbox", "RDM"), io);

        assert!(err.is_connection());
        assert_eq!(err.to_string(), "connection to vdbedcisandbox/RDM failed");
        let source = err.source().and_then(|s| s.downcast_ref::<DriverError>());
        assert!(matches!(source, Some(DriverError::Io { .. })));
    }

    #[test]
    fn test_statement_error_keeps_driver_source() {
        let err = Error::Statement(DriverError::Protocol("Incorrect syntax".into()));

        assert!(err.is_statement());
        assert!(err.source().is_some_and(|s| s.to_string().contains("Incorrect syntax")));
    }
}
