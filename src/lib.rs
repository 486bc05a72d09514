//! Shorthand helpers for ad-hoc SQL Server work.
//!
//! Friendly aliases expand to server and database names, every one-shot
//! operation gets its own connection, and [`TempTableSession`] keeps a
//! connection open for as long as a session-scoped temp table is needed.
//!
//! ```rust,ignore
//! use sqlshort::Settings;
//!
//! let executor = Settings::load(None)?.executor();
//! let loans = executor.query("SELECT TOP 3 * FROM loan", Some("loan"), Some("sand")).await?;
//!
//! let mut sample = executor
//!     .temp_table("SELECT TOP 10 * INTO #sample FROM loan;", Some("loan"), None)
//!     .await?;
//! let rows = sample.query("SELECT COUNT(*) n FROM #sample").await?;
//! sample.close().await?;
//! ```

pub mod config;
pub mod db;
pub mod error;
pub mod output;
pub mod shorthand;
pub mod utils;

pub use config::Settings;
pub use db::{
    resolve_database, resolve_server, Aliases, Auth, CellValue, ColumnInfo, Connection,
    ConnectionSettings, Connector, Executor, Table, Target, TdsConnection, TdsConnector,
    TempTableSession,
};
pub use error::{DriverError, Error, Result};
