//! Rendering result tables

use anyhow::Result;
use serde_json::{Map, Value};
use std::io::Write;
use unicode_width::UnicodeWidthStr;

use crate::db::{CellValue, Table};
use crate::utils::{pad, single_line, truncate};

/// Widest a text cell is allowed to get before it is cut
pub const MAX_CELL_WIDTH: usize = 60;

/// Output format
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    /// Aligned columns
    #[default]
    Table,
    Csv,
    /// One object per row
    Json,
}

pub fn render<W: Write>(table: &Table, format: Format, out: &mut W) -> Result<()> {
    match format {
        Format::Table => render_text(table, out),
        Format::Csv => render_csv(table, out),
        Format::Json => render_json(table, out),
    }
}

fn render_text<W: Write>(table: &Table, out: &mut W) -> Result<()> {
    if table.columns.is_empty() {
        return Ok(());
    }

    let cells: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|v| truncate(&single_line(&v.to_string()), MAX_CELL_WIDTH))
                .collect()
        })
        .collect();

    let mut widths: Vec<usize> = table
        .columns
        .iter()
        .map(|c| c.name.width().max(4))
        .collect();
    for row in &cells {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.width());
            }
        }
    }

    let header: Vec<String> = table
        .columns
        .iter()
        .zip(&widths)
        .map(|(c, w)| pad(&c.name, *w))
        .collect();
    writeln!(out, "{}", header.join(" | ").trim_end())?;

    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    writeln!(out, "{}", rule.join("-+-"))?;

    for row in &cells {
        let line: Vec<String> = row.iter().zip(&widths).map(|(c, w)| pad(c, *w)).collect();
        writeln!(out, "{}", line.join(" | ").trim_end())?;
    }

    Ok(())
}

fn render_csv<W: Write>(table: &Table, out: &mut W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);

    writer.write_record(table.columns.iter().map(|c| c.name.as_str()))?;
    for row in &table.rows {
        writer.write_record(row.iter().map(|v| match v {
            CellValue::Null => String::new(),
            // shortest representation that round-trips
            CellValue::Float(v) => v.to_string(),
            other => other.to_string(),
        }))?;
    }

    writer.flush()?;
    Ok(())
}

fn render_json<W: Write>(table: &Table, out: &mut W) -> Result<()> {
    let mut records = Vec::with_capacity(table.rows.len());

    for row in &table.rows {
        let mut record = Map::new();
        for (col, value) in table.columns.iter().zip(row) {
            record.insert(col.name.clone(), serde_json::to_value(value)?);
        }
        records.push(Value::Object(record));
    }

    serde_json::to_writer_pretty(&mut *out, &records)?;
    writeln!(out)?;
    Ok(())
}
