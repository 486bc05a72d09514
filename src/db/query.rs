//! Result tables and decoding of driver rows

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use futures::TryStreamExt;
use serde::{Serialize, Serializer};
use std::time::{Duration, Instant};
use tiberius::{numeric::Numeric, Column, ColumnType, QueryItem, QueryStream, Row};

use crate::error::{Error, Result};

/// Represents a cell value in the result set
#[derive(Clone, Debug, PartialEq)]
pub enum CellValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Numeric(String),
    String(String),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    DateTimeOffset(DateTime<FixedOffset>),
    Binary(Vec<u8>),
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::String(v) | CellValue::Numeric(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CellValue::Int(v) => Some(*v),
            _ => None,
        }
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Null => write!(f, "NULL"),
            CellValue::Bool(v) => write!(f, "{}", if *v { "true" } else { "false" }),
            CellValue::Int(v) => write!(f, "{}", v),
            CellValue::Float(v) => write!(f, "{:.6}", v),
            CellValue::Numeric(v) => write!(f, "{}", v),
            CellValue::String(v) => write!(f, "{}", v),
            CellValue::Date(v) => write!(f, "{}", v.format("%Y-%m-%d")),
            CellValue::Time(v) => write!(f, "{}", v.format("%H:%M:%S%.f")),
            CellValue::DateTime(v) => write!(f, "{}", v.format("%Y-%m-%d %H:%M:%S%.f")),
            CellValue::DateTimeOffset(v) => write!(f, "{}", v.format("%Y-%m-%d %H:%M:%S%.f %:z")),
            CellValue::Binary(v) => write!(f, "0x{}", hex::encode(v)),
        }
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            CellValue::Null => serializer.serialize_none(),
            CellValue::Bool(v) => serializer.serialize_bool(*v),
            CellValue::Int(v) => serializer.serialize_i64(*v),
            CellValue::Float(v) => serializer.serialize_f64(*v),
            CellValue::Numeric(v) | CellValue::String(v) => serializer.serialize_str(v),
            other => serializer.collect_str(other),
        }
    }
}

/// Column metadata
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ColumnInfo {
    pub name: String,
    pub type_name: String,
}

impl ColumnInfo {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

impl From<&Column> for ColumnInfo {
    fn from(col: &Column) -> Self {
        Self::new(col.name(), format_column_type(col))
    }
}

/// A fully materialised result set.
///
/// Rows keep the order the server returned them in.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<ColumnInfo>,
    pub rows: Vec<Vec<CellValue>>,
    pub execution_time: Duration,
}

impl Table {
    pub fn new(columns: Vec<ColumnInfo>, rows: Vec<Vec<CellValue>>) -> Self {
        Self {
            columns,
            rows,
            execution_time: Duration::ZERO,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Cell at `row` in the named column
    pub fn get(&self, row: usize, column: &str) -> Option<&CellValue> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx)
    }

    /// Collect the first result set of a batch, draining the rest.
    ///
    /// Column metadata is taken from the result's header, so a query that
    /// matches no rows still reports its schema.
    pub async fn collect(mut stream: QueryStream<'_>, start: Instant) -> Result<Self> {
        let mut columns: Vec<ColumnInfo> = Vec::new();
        let mut rows: Vec<Vec<CellValue>> = Vec::new();

        while let Some(item) = stream.try_next().await.map_err(Error::Statement)? {
            match item {
                QueryItem::Metadata(meta) if meta.result_index() == 0 => {
                    columns = meta.columns().iter().map(ColumnInfo::from).collect();
                }
                QueryItem::Row(row) if row.result_index() == 0 => {
                    rows.push(decode_row(&row));
                }
                _ => {}
            }
        }

        Ok(Self {
            columns,
            rows,
            execution_time: start.elapsed(),
        })
    }
}

fn decode_row(row: &Row) -> Vec<CellValue> {
    row.columns()
        .iter()
        .enumerate()
        .map(|(i, col)| extract_cell_value(row, i, col))
        .collect()
}

fn format_column_type(col: &Column) -> String {
    match col.column_type() {
        ColumnType::Null => "NULL".to_string(),
        ColumnType::Bit | ColumnType::Bitn => "BIT".to_string(),
        ColumnType::Int1 => "TINYINT".to_string(),
        ColumnType::Int2 => "SMALLINT".to_string(),
        ColumnType::Int4 => "INT".to_string(),
        ColumnType::Int8 => "BIGINT".to_string(),
        ColumnType::Intn => "INT".to_string(),
        ColumnType::Float4 => "REAL".to_string(),
        ColumnType::Float8 | ColumnType::Floatn => "FLOAT".to_string(),
        ColumnType::Datetime | ColumnType::Datetimen => "DATETIME".to_string(),
        ColumnType::Datetime4 => "SMALLDATETIME".to_string(),
        ColumnType::Datetime2 => "DATETIME2".to_string(),
        ColumnType::DatetimeOffsetn => "DATETIMEOFFSET".to_string(),
        ColumnType::Daten => "DATE".to_string(),
        ColumnType::Timen => "TIME".to_string(),
        ColumnType::Decimaln => "DECIMAL".to_string(),
        ColumnType::Numericn => "NUMERIC".to_string(),
        ColumnType::Money => "MONEY".to_string(),
        ColumnType::Money4 => "SMALLMONEY".to_string(),
        ColumnType::Guid => "UNIQUEIDENTIFIER".to_string(),
        ColumnType::BigVarChar => "VARCHAR".to_string(),
        ColumnType::BigChar => "CHAR".to_string(),
        ColumnType::NVarchar => "NVARCHAR".to_string(),
        ColumnType::NChar => "NCHAR".to_string(),
        ColumnType::Text => "TEXT".to_string(),
        ColumnType::NText => "NTEXT".to_string(),
        ColumnType::BigVarBin => "VARBINARY".to_string(),
        ColumnType::BigBinary => "BINARY".to_string(),
        ColumnType::Image => "IMAGE".to_string(),
        ColumnType::Xml => "XML".to_string(),
        other => format!("{:?}", other).to_uppercase(),
    }
}

/// Typed read that treats NULLs and conversion failures alike
fn read<'a, T>(row: &'a Row, index: usize) -> Option<T>
where
    T: tiberius::FromSql<'a>,
{
    row.try_get::<T, _>(index).ok().flatten()
}

fn extract_cell_value(row: &Row, index: usize, col: &Column) -> CellValue {
    let value = match col.column_type() {
        ColumnType::Null => None,
        ColumnType::Bit | ColumnType::Bitn => read::<bool>(row, index).map(CellValue::Bool),
        ColumnType::Int1 => read::<u8>(row, index).map(|v| CellValue::Int(v as i64)),
        ColumnType::Int2 => read::<i16>(row, index).map(|v| CellValue::Int(v as i64)),
        ColumnType::Int4 => read::<i32>(row, index).map(|v| CellValue::Int(v as i64)),
        ColumnType::Int8 => read::<i64>(row, index).map(CellValue::Int),
        ColumnType::Intn => read_any_int(row, index),
        ColumnType::Float4 => read::<f32>(row, index).map(|v| CellValue::Float(v as f64)),
        ColumnType::Float8 | ColumnType::Money | ColumnType::Money4 => {
            read::<f64>(row, index).map(CellValue::Float)
        }
        ColumnType::Floatn => read::<f64>(row, index)
            .or_else(|| read::<f32>(row, index).map(|v| v as f64))
            .map(CellValue::Float),
        ColumnType::Decimaln | ColumnType::Numericn => {
            read::<Numeric>(row, index).map(|v| CellValue::Numeric(v.to_string()))
        }
        ColumnType::Daten => read::<NaiveDate>(row, index).map(CellValue::Date),
        ColumnType::Timen => read::<NaiveTime>(row, index).map(CellValue::Time),
        ColumnType::Datetime
        | ColumnType::Datetimen
        | ColumnType::Datetime4
        | ColumnType::Datetime2 => read::<NaiveDateTime>(row, index).map(CellValue::DateTime),
        ColumnType::DatetimeOffsetn => {
            read::<DateTime<FixedOffset>>(row, index).map(CellValue::DateTimeOffset)
        }
        ColumnType::BigVarChar
        | ColumnType::BigChar
        | ColumnType::NVarchar
        | ColumnType::NChar
        | ColumnType::Text
        | ColumnType::NText => read::<&str>(row, index).map(|v| CellValue::String(v.to_string())),
        ColumnType::Xml => read::<&tiberius::xml::XmlData>(row, index)
            .map(|v| CellValue::String(v.to_string())),
        ColumnType::Guid => {
            read::<tiberius::Uuid>(row, index).map(|v| CellValue::String(v.to_string()))
        }
        ColumnType::BigVarBin | ColumnType::BigBinary | ColumnType::Image => {
            read::<&[u8]>(row, index).map(|v| CellValue::Binary(v.to_vec()))
        }
        _ => read_fallback(row, index),
    };

    value.unwrap_or(CellValue::Null)
}

fn read_any_int(row: &Row, index: usize) -> Option<CellValue> {
    read::<i32>(row, index)
        .map(|v| v as i64)
        .or_else(|| read::<i64>(row, index))
        .or_else(|| read::<i16>(row, index).map(|v| v as i64))
        .or_else(|| read::<u8>(row, index).map(|v| v as i64))
        .map(CellValue::Int)
}

// Try various types in order of likelihood
fn read_fallback(row: &Row, index: usize) -> Option<CellValue> {
    if let Some(v) = read::<&str>(row, index) {
        return Some(CellValue::String(v.to_string()));
    }
    if let Some(v) = read::<NaiveDateTime>(row, index) {
        return Some(CellValue::DateTime(v));
    }
    if let Some(v) = read_any_int(row, index) {
        return Some(v);
    }
    if let Some(v) = read::<f64>(row, index) {
        return Some(CellValue::Float(v));
    }
    read::<Numeric>(row, index).map(|v| CellValue::Numeric(v.to_string()))
}

// Helper for hex encoding binary data
mod hex {
    pub fn encode(data: &[u8]) -> String {
        data.iter().map(|b| format!("{:02X}", b)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::new(
            vec![ColumnInfo::new("id", "INT"), ColumnInfo::new("name", "NVARCHAR")],
            vec![
                vec![CellValue::Int(1), CellValue::String("alpha".into())],
                vec![CellValue::Int(2), CellValue::Null],
            ],
        )
    }

    #[test]
    fn test_cell_display() {
        assert_eq!(CellValue::Null.to_string(), "NULL");
        assert_eq!(CellValue::Bool(true).to_string(), "true");
        assert_eq!(CellValue::Float(1.5).to_string(), "1.500000");
        assert_eq!(CellValue::Binary(vec![0x0a, 0xff]).to_string(), "0x0AFF");

        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(CellValue::Date(date).to_string(), "2024-02-29");

        let dt = date.and_hms_opt(13, 5, 9).unwrap();
        assert_eq!(CellValue::DateTime(dt).to_string(), "2024-02-29 13:05:09");
    }

    #[test]
    fn test_cell_json() {
        let json = serde_json::to_string(&vec![
            CellValue::Null,
            CellValue::Int(7),
            CellValue::Numeric("12.50".into()),
            CellValue::Date(NaiveDate::from_ymd_opt(2020, 1, 2).unwrap()),
        ])
        .unwrap();
        assert_eq!(json, r#"[null,7,"12.50","2020-01-02"]"#);
    }

    #[test]
    fn test_table_lookup() {
        let table = sample();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_names(), vec!["id", "name"]);
        assert_eq!(table.column_index("NAME"), Some(1));
        assert_eq!(table.get(0, "name").and_then(CellValue::as_str), Some("alpha"));
        assert!(table.get(1, "name").is_some_and(CellValue::is_null));
        assert_eq!(table.get(5, "id"), None);
        assert_eq!(table.get(0, "missing"), None);
    }

    #[test]
    fn test_empty_table() {
        let table = Table::empty();
        assert!(table.is_empty());
        assert!(table.columns.is_empty());
    }
}
