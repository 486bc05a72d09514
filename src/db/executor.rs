//! One connection per operation

use tracing::debug;

use super::{Aliases, Connection, Connector, Table, Target, TempTableSession};
use crate::error::Result;

/// Runs statements against alias-resolved targets.
///
/// Each call opens its own connection and releases it before returning, on
/// the error path as well. Nothing is pooled or reused between calls.
pub struct Executor<C> {
    connector: C,
    aliases: Aliases,
    defaults: Target,
    dictionary: Target,
}

impl<C: Connector> Executor<C> {
    pub fn new(connector: C) -> Self {
        Self {
            connector,
            aliases: Aliases::builtin(),
            defaults: Target::default_environment(),
            dictionary: Target::dictionary(),
        }
    }

    pub fn with_aliases(mut self, aliases: Aliases) -> Self {
        self.aliases = aliases;
        self
    }

    pub fn with_defaults(mut self, defaults: Target) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn with_dictionary(mut self, dictionary: Target) -> Self {
        self.dictionary = dictionary;
        self
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    pub fn aliases(&self) -> &Aliases {
        &self.aliases
    }

    pub fn defaults(&self) -> &Target {
        &self.defaults
    }

    pub fn dictionary(&self) -> &Target {
        &self.dictionary
    }

    /// Expand aliases, falling back to the default environment
    pub fn target(&self, database: Option<&str>, server: Option<&str>) -> Target {
        self.target_from(&self.defaults, database, server)
    }

    pub(crate) fn target_from(
        &self,
        base: &Target,
        database: Option<&str>,
        server: Option<&str>,
    ) -> Target {
        self.aliases.resolve(
            database.unwrap_or(&base.database),
            server.unwrap_or(&base.server),
        )
    }

    /// Run a command, e.g. dropping a global temp table
    pub async fn execute(
        &self,
        command: &str,
        database: Option<&str>,
        server: Option<&str>,
    ) -> Result<()> {
        let target = self.target(database, server);
        debug!(%target, "execute");

        let mut conn = self.connector.connect(&target).await?;
        let outcome = conn.execute(command).await;
        finish(conn, outcome).await
    }

    /// Run a query and return its rows
    pub async fn query(
        &self,
        query: &str,
        database: Option<&str>,
        server: Option<&str>,
    ) -> Result<Table> {
        let target = self.target(database, server);
        self.query_at(&target, query).await
    }

    pub(crate) async fn query_at(&self, target: &Target, query: &str) -> Result<Table> {
        debug!(%target, "query");

        let mut conn = self.connector.connect(target).await?;
        let outcome = conn.query(query).await;
        finish(conn, outcome).await
    }

    /// Open a session whose temp table outlives this call.
    ///
    /// `create` is typically `SELECT ... INTO #name ...`. The caller owns the
    /// returned session and must [`close`](TempTableSession::close) it.
    pub async fn temp_table(
        &self,
        create: &str,
        database: Option<&str>,
        server: Option<&str>,
    ) -> Result<TempTableSession<C::Connection>> {
        let target = self.target(database, server);
        TempTableSession::open(&self.connector, target, create).await
    }
}

/// Release `conn`, preferring the operation's own error over a close failure
pub(crate) async fn finish<T, K: Connection>(conn: K, outcome: Result<T>) -> Result<T> {
    let closed = conn.close().await;
    let value = outcome?;
    closed?;
    Ok(value)
}
