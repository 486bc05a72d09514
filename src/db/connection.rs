//! SQL Server connection management

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Instant;
use tiberius::{AuthMethod, Client, Config, EncryptionLevel, SqlBrowser};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};
use tracing::debug;

use super::{Table, Target};
use crate::error::{DriverError, Error, Result};

/// How to authenticate against the server
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum Auth {
    /// Trusted connection using the caller's OS identity
    #[default]
    Integrated,
    /// SQL Server login
    SqlServer { user: String, password: String },
}

impl Auth {
    fn method(&self) -> std::result::Result<AuthMethod, DriverError> {
        match self {
            Auth::Integrated => integrated_auth(),
            Auth::SqlServer { user, password } => Ok(AuthMethod::sql_server(user, password)),
        }
    }
}

#[cfg(any(all(unix, feature = "integrated-auth-gssapi"), all(windows, feature = "winauth")))]
fn integrated_auth() -> std::result::Result<AuthMethod, DriverError> {
    Ok(AuthMethod::Integrated)
}

#[cfg(not(any(all(unix, feature = "integrated-auth-gssapi"), all(windows, feature = "winauth"))))]
fn integrated_auth() -> std::result::Result<AuthMethod, DriverError> {
    Err(DriverError::Protocol(
        "integrated authentication needs the `winauth` (Windows) or \
         `integrated-auth-gssapi` (Unix) feature; configure a sql_server login instead"
            .into(),
    ))
}

/// Connection settings shared by every target
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ConnectionSettings {
    pub port: u16,
    pub auth: Auth,
    pub encrypt: bool,
    pub trust_cert: bool,
    pub application_name: String,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            port: 1433,
            auth: Auth::Integrated,
            encrypt: false,
            trust_cert: true,
            application_name: "sqlshort".to_string(),
        }
    }
}

impl ConnectionSettings {
    /// Build the driver configuration for one target
    pub fn client_config(&self, target: &Target) -> std::result::Result<Config, DriverError> {
        let endpoint = target.endpoint();
        let mut config = Config::new();

        config.host(&endpoint.host);
        config.port(endpoint.port.unwrap_or(self.port));
        if let Some(instance) = &endpoint.instance {
            config.instance_name(instance);
        }
        config.database(&target.database);
        config.application_name(&self.application_name);
        config.authentication(self.auth.method()?);

        if self.trust_cert {
            config.trust_cert();
        }

        if !self.encrypt {
            config.encryption(EncryptionLevel::NotSupported);
        }

        Ok(config)
    }
}

/// Opens sessions to a resolved target
#[async_trait]
pub trait Connector: Send + Sync {
    type Connection: Connection;

    async fn connect(&self, target: &Target) -> Result<Self::Connection>;
}

/// One live session to a (server, database) pair.
///
/// Every statement runs in autocommit mode.
#[async_trait]
pub trait Connection: Send {
    /// Run a statement (or batch), discarding any rows it produces
    async fn execute(&mut self, statement: &str) -> Result<()>;

    /// Run a query and materialise its first result set
    async fn query(&mut self, query: &str) -> Result<Table>;

    /// Release the session
    async fn close(self) -> Result<()>;
}

/// Connector backed by tiberius over TCP
#[derive(Clone, Debug, Default)]
pub struct TdsConnector {
    settings: ConnectionSettings,
}

impl TdsConnector {
    pub fn new(settings: ConnectionSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ConnectionSettings {
        &self.settings
    }

    async fn open(
        &self,
        target: &Target,
    ) -> std::result::Result<Client<Compat<TcpStream>>, DriverError> {
        let config = self.settings.client_config(target)?;
        let endpoint = target.endpoint();

        // Named instances without an explicit port go through SQL Browser
        let tcp = if endpoint.instance.is_some() && endpoint.port.is_none() {
            TcpStream::connect_named(&config).await?
        } else {
            TcpStream::connect(config.get_addr()).await?
        };

        tcp.set_nodelay(true)?;

        Client::connect(config, tcp.compat_write()).await
    }
}

#[async_trait]
impl Connector for TdsConnector {
    type Connection = TdsConnection;

    async fn connect(&self, target: &Target) -> Result<TdsConnection> {
        debug!(server = %target.server, database = %target.database, "connecting");

        let client = self
            .open(target)
            .await
            .map_err(|e| Error::connection(target, e))?;

        debug!(server = %target.server, database = %target.database, "connected");

        Ok(TdsConnection {
            client,
            target: target.clone(),
        })
    }
}

/// Live tiberius session
pub struct TdsConnection {
    client: Client<Compat<TcpStream>>,
    target: Target,
}

impl TdsConnection {
    pub fn target(&self) -> &Target {
        &self.target
    }
}

#[async_trait]
impl Connection for TdsConnection {
    async fn execute(&mut self, statement: &str) -> Result<()> {
        // Sent as a plain batch so `#temp` objects stay bound to this session
        let stream = self
            .client
            .simple_query(statement)
            .await
            .map_err(Error::Statement)?;

        stream.into_results().await.map_err(Error::Statement)?;

        Ok(())
    }

    async fn query(&mut self, query: &str) -> Result<Table> {
        let start = Instant::now();

        let stream = self
            .client
            .simple_query(query)
            .await
            .map_err(Error::Statement)?;

        let table = Table::collect(stream, start).await?;

        debug!(
            server = %self.target.server,
            database = %self.target.database,
            rows = table.row_count(),
            columns = table.columns.len(),
            elapsed_ms = table.execution_time.as_millis() as u64,
            "query complete"
        );

        Ok(table)
    }

    async fn close(self) -> Result<()> {
        let target = self.target;
        self.client
            .close()
            .await
            .map_err(|e| Error::connection(&target, e))?;

        debug!(server = %target.server, database = %target.database, "connection closed");
        Ok(())
    }
}
