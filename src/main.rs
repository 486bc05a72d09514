//! sqlshort command-line front end

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use sqlshort::db::DEFAULT_PEEK_ROWS;
use sqlshort::output::{self, Format};
use sqlshort::utils::{format_duration, format_number};
use sqlshort::{Settings, Table};

#[derive(Parser)]
#[command(name = "sqlshort")]
#[command(about = "Shorthand queries against SQL Server", long_about = None)]
struct Cli {
    /// Settings file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database name or alias
    #[arg(short, long, global = true)]
    database: Option<String>,

    /// Server name or alias
    #[arg(short, long, global = true)]
    server: Option<String>,

    /// Output format for result tables
    #[arg(long, value_enum, default_value_t = Format::Table, global = true)]
    format: Format,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a statement, e.g. dropping a global temp table
    Exec {
        statement: String,
    },
    /// Run a query and print its rows
    Query {
        query: String,
    },
    /// List user tables
    Tables,
    /// Find columns whose name contains every term
    FindCols {
        #[arg(required = true)]
        terms: Vec<String>,
    },
    /// Find tables by name
    FindTables {
        #[arg(required = true)]
        terms: Vec<String>,
    },
    /// Look up a column in the data dictionary
    Def {
        term: String,
    },
    /// Show the first rows of a table
    Head {
        table: String,
        /// Number of rows
        #[arg(short = 'n', long, default_value_t = DEFAULT_PEEK_ROWS)]
        rows: u32,
    },
    /// List the columns of a table
    Cols {
        table: String,
    },
    /// Create a temp table, query it on the same session, then close
    Temp {
        /// Creation statement, e.g. SELECT TOP 10 * INTO #sample FROM loan
        create: String,
        /// Follow-up query run on the session (repeatable)
        #[arg(long = "then")]
        then: Vec<String>,
    },
    /// Show what an alias resolves to
    Resolve {
        alias: String,
    },
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("sqlshort=debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn print_table(table: &Table, format: Format) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    output::render(table, format, &mut out)?;
    out.flush()?;

    print_summary(table.row_count(), table.execution_time);
    Ok(())
}

fn print_summary(rows: usize, elapsed: Duration) {
    eprintln!(
        "{} row(s) in {}",
        format_number(rows as i64),
        format_duration(elapsed)
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let settings = Settings::load(cli.config.as_deref())?;
    let executor = settings.executor();
    let database = cli.database.as_deref();
    let server = cli.server.as_deref();

    match cli.command {
        Commands::Exec { statement } => {
            executor
                .execute(&statement, database, server)
                .await
                .context("Command failed")?;
            eprintln!("OK");
        }
        Commands::Query { query } => {
            let table = executor
                .query(&query, database, server)
                .await
                .context("Query failed")?;
            print_table(&table, cli.format)?;
        }
        Commands::Tables => {
            let table = executor.list_tables(database, server).await?;
            print_table(&table, cli.format)?;
        }
        Commands::FindCols { terms } => {
            let table = executor.find_columns(&terms, database, server).await?;
            print_table(&table, cli.format)?;
        }
        Commands::FindTables { terms } => {
            let table = executor.find_tables(&terms, database, server).await?;
            print_table(&table, cli.format)?;
        }
        Commands::Def { term } => {
            let table = executor.lookup_definition(&term, database, server).await?;
            print_table(&table, cli.format)?;
        }
        Commands::Head { table, rows } => {
            let table = executor.peek(&table, rows, database, server).await?;
            print_table(&table, cli.format)?;
        }
        Commands::Cols { table } => {
            for name in executor.list_columns(&table, database, server).await? {
                println!("{}", name);
            }
        }
        Commands::Temp { create, then } => {
            let mut session = executor
                .temp_table(&create, database, server)
                .await
                .context("Failed to create temp table")?;

            let mut outcome = Ok(());
            for query in &then {
                outcome = match session.query(query).await {
                    Ok(table) => print_table(&table, cli.format),
                    Err(e) => {
                        Err(anyhow::Error::new(e).context(format!("Query failed: {}", query)))
                    }
                };
                if outcome.is_err() {
                    break;
                }
            }

            session.close_after(outcome).await?;
        }
        Commands::Resolve { alias } => {
            let target = executor.target(Some(&alias), Some(&alias));
            println!("server:   {}", target.server);
            println!("database: {}", target.database);
        }
    }

    Ok(())
}
