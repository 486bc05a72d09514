//! Catalog shorthand queries

use super::{Connector, Executor, Table};
use crate::error::Result;

/// Rows shown by [`Executor::peek`] when no count is given
pub const DEFAULT_PEEK_ROWS: u32 = 5;

/// Quote a search term as a `LIKE '%term%'` literal
fn like_literal(term: &str) -> String {
    format!("'%{}%'", term.replace('\'', "''"))
}

/// Split terms into the first one and the rest; no terms means one empty term
fn split_terms<S: AsRef<str>>(terms: &[S]) -> (&str, &[S]) {
    match terms.split_first() {
        Some((first, rest)) => (first.as_ref(), rest),
        None => ("", terms),
    }
}

pub fn list_tables_sql() -> String {
    "SELECT name FROM SYSOBJECTS WHERE xtype = 'U' ORDER BY 1;".to_string()
}

/// Columns whose name contains every term, with their tables
pub fn find_columns_sql<S: AsRef<str>>(terms: &[S]) -> String {
    let (first, rest) = split_terms(terms);

    let mut query = format!(
        "SELECT c.name column_name, t.name table_name \
         FROM sys.columns c \
         INNER JOIN sys.tables t ON c.object_id = t.object_id \
         WHERE c.name LIKE {}",
        like_literal(first)
    );

    for term in rest {
        query.push_str(&format!(" AND c.name LIKE {}", like_literal(term.as_ref())));
    }
    query.push(';');

    query
}

/// Tables whose name contains the first term.
///
/// Further terms are filtered on `c.name`, which this query never binds, so
/// the server rejects searches with more than one term.
pub fn find_tables_sql<S: AsRef<str>>(terms: &[S]) -> String {
    let (first, rest) = split_terms(terms);

    let mut query = format!(
        "SELECT name table_name FROM sys.tables WHERE name LIKE {}",
        like_literal(first)
    );

    for term in rest {
        query.push_str(&format!(" AND c.name LIKE {}", like_literal(term.as_ref())));
    }
    query.push(';');

    query
}

/// Business definitions from the data dictionary
pub fn lookup_definition_sql(term: &str) -> String {
    format!(
        "SELECT RDM_COLUMN_NAME column_name, \
         RDM_TABLE_NAME table_name, \
         RDM_BUSINESS_DEFINITION definition \
         FROM Data_Dictionary \
         WHERE RDM_COLUMN_NAME LIKE {};",
        like_literal(term)
    )
}

pub fn peek_sql(table: &str, rows: u32) -> String {
    format!("SELECT TOP {} * FROM {};", rows, table)
}

pub fn list_columns_sql(table: &str) -> String {
    peek_sql(table, 1)
}

impl<C: Connector> Executor<C> {
    /// All user tables in the database
    pub async fn list_tables(&self, database: Option<&str>, server: Option<&str>) -> Result<Table> {
        self.query(&list_tables_sql(), database, server).await
    }

    pub async fn find_columns<S: AsRef<str>>(
        &self,
        terms: &[S],
        database: Option<&str>,
        server: Option<&str>,
    ) -> Result<Table> {
        self.query(&find_columns_sql(terms), database, server).await
    }

    pub async fn find_tables<S: AsRef<str>>(
        &self,
        terms: &[S],
        database: Option<&str>,
        server: Option<&str>,
    ) -> Result<Table> {
        self.query(&find_tables_sql(terms), database, server).await
    }

    /// Search the data dictionary; defaults to the dictionary target
    pub async fn lookup_definition(
        &self,
        term: &str,
        database: Option<&str>,
        server: Option<&str>,
    ) -> Result<Table> {
        let target = self.target_from(self.dictionary(), database, server);
        self.query_at(&target, &lookup_definition_sql(term)).await
    }

    /// First `rows` rows of a table
    pub async fn peek(
        &self,
        table: &str,
        rows: u32,
        database: Option<&str>,
        server: Option<&str>,
    ) -> Result<Table> {
        self.query(&peek_sql(table, rows), database, server).await
    }

    /// Column names of a table, in order
    pub async fn list_columns(
        &self,
        table: &str,
        database: Option<&str>,
        server: Option<&str>,
    ) -> Result<Vec<String>> {
        let result = self.query(&list_columns_sql(table), database, server).await?;
        Ok(result.column_names())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_columns_sql() {
        let sql = find_columns_sql(&["loan", "date"]);
        assert!(sql.contains("FROM sys.columns c"));
        assert!(sql.contains("WHERE c.name LIKE '%loan%' AND c.name LIKE '%date%';"));
    }

    #[test]
    fn test_find_tables_sql_keeps_unbound_alias() {
        assert_eq!(
            find_tables_sql(&["loan"]),
            "SELECT name table_name FROM sys.tables WHERE name LIKE '%loan%';"
        );
        assert_eq!(
            find_tables_sql(&["loan", "hist"]),
            "SELECT name table_name FROM sys.tables WHERE name LIKE '%loan%' AND c.name LIKE '%hist%';"
        );
    }

    #[test]
    fn test_empty_terms_match_everything() {
        let none: [&str; 0] = [];
        assert!(find_columns_sql(&none).ends_with("WHERE c.name LIKE '%%';"));
        assert!(find_tables_sql(&none).ends_with("WHERE name LIKE '%%';"));
    }

    #[test]
    fn test_terms_are_quoted() {
        let sql = lookup_definition_sql("o'brien");
        assert!(sql.contains("LIKE '%o''brien%'"));
        assert!(sql.contains("FROM Data_Dictionary"));
    }

    #[test]
    fn test_owned_terms() {
        let terms = vec!["acct".to_string()];
        assert!(find_columns_sql(&terms).contains("'%acct%'"));
    }

    #[test]
    fn test_peek_sql() {
        assert_eq!(peek_sql("dbo.loan", 3), "SELECT TOP 3 * FROM dbo.loan;");
        assert_eq!(list_columns_sql("[dbo].[loan]"), "SELECT TOP 1 * FROM [dbo].[loan];");
        assert_eq!(list_tables_sql(), "SELECT name FROM SYSOBJECTS WHERE xtype = 'U' ORDER BY 1;");
    }
}
