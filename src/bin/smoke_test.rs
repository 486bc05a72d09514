//! Live checks against a real server
//! Run with: cargo run --release --bin smoke_test -- <table> [database] [server]

use sqlshort::{Settings, Table};

fn report(name: &str, outcome: Result<String, String>, passed: &mut u32, failed: &mut u32) {
    match outcome {
        Ok(detail) => {
            println!("✓ {}: {}", name, detail);
            *passed += 1;
        }
        Err(e) => {
            println!("✗ {}: {}", name, e);
            *failed += 1;
        }
    }
}

fn describe(table: &Table) -> String {
    format!(
        "{} row(s), {} column(s) in {:?}",
        table.row_count(),
        table.columns.len(),
        table.execution_time
    )
}

#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().collect();
    let Some(table) = args.get(1) else {
        println!("usage: smoke_test <table> [database] [server]");
        return;
    };
    let database = args.get(2).map(String::as_str);
    let server = args.get(3).map(String::as_str);

    let settings = match Settings::load(None) {
        Ok(settings) => settings,
        Err(e) => {
            println!("✗ Settings: {:#}", e);
            return;
        }
    };
    let executor = settings.executor();
    println!("=== Smoke tests against {} ===\n", executor.target(database, server));

    let mut passed = 0;
    let mut failed = 0;

    // Test 1: simple query
    let outcome = executor
        .query("SELECT 1 AS num, 'hello' AS txt", database, server)
        .await
        .map_err(|e| format!("{:#}", anyhow::Error::new(e)))
        .and_then(|t| match t.column_names().as_slice() {
            [a, b] if a == "num" && b == "txt" => Ok(describe(&t)),
            other => Err(format!("unexpected columns {:?}", other)),
        });
    report("Simple SELECT", outcome, &mut passed, &mut failed);

    // Test 2: TOP 3 returns at most three rows with the table's columns
    let columns = executor.list_columns(table, database, server).await;
    let peek = executor.peek(table, 3, database, server).await;
    let outcome = match (columns, peek) {
        (Ok(columns), Ok(rows)) if rows.row_count() <= 3 && rows.column_names() == columns => {
            Ok(describe(&rows))
        }
        (Ok(_), Ok(rows)) => Err(format!("schema or row count mismatch: {}", describe(&rows))),
        (Err(e), _) | (_, Err(e)) => Err(format!("{:#}", anyhow::Error::new(e))),
    };
    report("TOP 3", outcome, &mut passed, &mut failed);

    // Test 3: temp table survives until close
    let create = format!("SELECT TOP 3 * INTO #smoke_test FROM {};", table);
    let outcome = match executor.temp_table(&create, database, server).await {
        Ok(mut session) => {
            let counted = session.query("SELECT COUNT(*) AS n FROM #smoke_test").await;
            let closed = session.close().await;
            match (counted, closed) {
                (Ok(t), Ok(())) => {
                    let n = t.get(0, "n").map(|c| c.to_string()).unwrap_or_default();
                    Ok(format!("{} row(s) in #smoke_test", n))
                }
                (Err(e), _) | (_, Err(e)) => Err(format!("{:#}", anyhow::Error::new(e))),
            }
        }
        Err(e) => Err(format!("{:#}", anyhow::Error::new(e))),
    };
    report("Temp table session", outcome, &mut passed, &mut failed);

    // Test 4: unknown database is a connection failure
    let outcome = match executor
        .query("SELECT 1", Some("sqlshort_missing_database"), server)
        .await
    {
        Err(e) if e.is_connection() => Ok("connection error as expected".to_string()),
        Err(e) => Err(format!("wrong error class: {:#}", anyhow::Error::new(e))),
        Ok(_) => Err("query unexpectedly succeeded".to_string()),
    };
    report("Unknown database", outcome, &mut passed, &mut failed);

    // Test 5: syntax error is a statement failure
    let outcome = match executor.execute("SELEC 1", database, server).await {
        Err(e) if e.is_statement() => Ok("statement error as expected".to_string()),
        Err(e) => Err(format!("wrong error class: {:#}", anyhow::Error::new(e))),
        Ok(()) => Err("statement unexpectedly succeeded".to_string()),
    };
    report("Bad statement", outcome, &mut passed, &mut failed);

    // Summary
    println!("\n=== SUMMARY ===");
    println!("Passed: {}", passed);
    println!("Failed: {}", failed);
    if failed == 0 {
        println!("\n=== ALL TESTS PASSED ===");
    } else {
        println!("\n=== SOME TESTS FAILED ===");
    }
}
