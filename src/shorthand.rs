//! Free-function shorthands over a default executor.
//!
//! These use the built-in settings: integrated authentication, the built-in
//! alias tables and the default environment. Load a [`Settings`] and call
//! [`Settings::executor`] for anything else.

use std::sync::OnceLock;

use crate::config::Settings;
use crate::db::{Executor, Table, TdsConnection, TdsConnector, TempTableSession, DEFAULT_PEEK_ROWS};
use crate::error::Result;

fn executor() -> &'static Executor<TdsConnector> {
    static DEFAULT: OnceLock<Executor<TdsConnector>> = OnceLock::new();
    DEFAULT.get_or_init(|| Settings::default().executor())
}

pub async fn execute(command: &str, database: Option<&str>, server: Option<&str>) -> Result<()> {
    executor().execute(command, database, server).await
}

pub async fn query(query: &str, database: Option<&str>, server: Option<&str>) -> Result<Table> {
    executor().query(query, database, server).await
}

pub async fn list_tables(database: Option<&str>, server: Option<&str>) -> Result<Table> {
    executor().list_tables(database, server).await
}

pub async fn find_columns<S: AsRef<str>>(
    terms: &[S],
    database: Option<&str>,
    server: Option<&str>,
) -> Result<Table> {
    executor().find_columns(terms, database, server).await
}

pub async fn find_tables<S: AsRef<str>>(
    terms: &[S],
    database: Option<&str>,
    server: Option<&str>,
) -> Result<Table> {
    executor().find_tables(terms, database, server).await
}

pub async fn lookup_definition(
    term: &str,
    database: Option<&str>,
    server: Option<&str>,
) -> Result<Table> {
    executor().lookup_definition(term, database, server).await
}

/// First rows of a table; `None` shows five
pub async fn peek(
    table: &str,
    rows: Option<u32>,
    database: Option<&str>,
    server: Option<&str>,
) -> Result<Table> {
    executor()
        .peek(table, rows.unwrap_or(DEFAULT_PEEK_ROWS), database, server)
        .await
}

pub async fn list_columns(
    table: &str,
    database: Option<&str>,
    server: Option<&str>,
) -> Result<Vec<String>> {
    executor().list_columns(table, database, server).await
}

pub async fn temp_table(
    create: &str,
    database: Option<&str>,
    server: Option<&str>,
) -> Result<TempTableSession<TdsConnection>> {
    executor().temp_table(create, database, server).await
}
