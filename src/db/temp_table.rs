//! Temp tables that live as long as their session

use tracing::info;

use super::{executor::finish, Connection, Connector, Table, Target};
use crate::error::{Error, Result};

/// A connection kept open so a session-scoped temp table stays alive.
///
/// The session is released only by [`close`](Self::close), which consumes it,
/// so a session cannot be closed twice. Dropping it without closing tears down
/// the socket with no orderly logout.
pub struct TempTableSession<K: Connection> {
    conn: K,
    target: Target,
}

impl<K: Connection> TempTableSession<K> {
    /// Connect to `target` and run `create` on the new session.
    ///
    /// If `create` fails the connection is released before the error is
    /// returned.
    pub async fn open<C>(connector: &C, target: Target, create: &str) -> Result<Self>
    where
        C: Connector<Connection = K>,
    {
        let mut conn = connector.connect(&target).await?;

        if let Err(e) = conn.execute(create).await {
            return finish(conn, Err(e)).await;
        }

        info!(%target, "temp table session opened");
        Ok(Self { conn, target })
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Run a further statement on the held connection
    pub async fn execute(&mut self, statement: &str) -> Result<()> {
        self.conn.execute(statement).await
    }

    /// Query on the held connection, where the temp table is visible
    pub async fn query(&mut self, query: &str) -> Result<Table> {
        self.conn.query(query).await
    }

    /// Release the session after work done on it.
    ///
    /// The session is closed whatever `outcome` holds; an error in `outcome`
    /// wins over a failed close.
    pub async fn close_after<T, E>(
        self,
        outcome: std::result::Result<T, E>,
    ) -> std::result::Result<T, E>
    where
        E: From<Error>,
    {
        let closed = self.close().await;
        let value = outcome?;
        closed?;
        Ok(value)
    }

    /// Release the held connection
    pub async fn close(self) -> Result<()> {
        let target = self.target;
        self.conn.close().await?;
        info!(%target, "temp table session closed");
        Ok(())
    }
}
