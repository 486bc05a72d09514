//! Database module for SQL Server connectivity

mod alias;
mod connection;
mod executor;
mod lookup;
mod query;
mod temp_table;

pub use alias::*;
pub use connection::*;
pub use executor::*;
pub use lookup::*;
pub use query::*;
pub use temp_table::*;
