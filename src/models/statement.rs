//! Canonical `INSERT` statement rendering
//!
//! A backup stores one statement per record. Every statement is a single line
//! ending in `);\n`, so values must never introduce raw line breaks.

use chrono::{NaiveDate, NaiveDateTime};

/// Schema the statements target
pub const SCHEMA: &str = "food_pantry_manager";

/// Format used for timestamp columns
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A record that can be reconstructed from one statement line
pub trait InsertStatement {
    /// Render the record as exactly one line, terminator included
    fn as_insert_statement(&self) -> String;
}

/// Incrementally builds an `INSERT` statement for one table
#[derive(Debug)]
pub struct StatementBuilder {
    table: &'static str,
    columns: Vec<&'static str>,
    values: Vec<String>,
}

impl StatementBuilder {
    /// Start a statement for the given table
    pub fn new(table: &'static str) -> Self {
        Self {
            table,
            columns: Vec::new(),
            values: Vec::new(),
        }
    }

    fn push(mut self, column: &'static str, value: String) -> Self {
        self.columns.push(column);
        self.values.push(value);
        self
    }

    /// Integer column
    pub fn int(self, column: &'static str, value: i64) -> Self {
        self.push(column, value.to_string())
    }

    /// Nullable integer column
    pub fn opt_int(self, column: &'static str, value: Option<i64>) -> Self {
        let rendered = value.map_or_else(|| "NULL".to_string(), |v| v.to_string());
        self.push(column, rendered)
    }

    /// Text column, double-quoted
    pub fn text(self, column: &'static str, value: &str) -> Self {
        self.push(column, quote(value))
    }

    /// Nullable text column
    pub fn opt_text(self, column: &'static str, value: Option<&str>) -> Self {
        let rendered = value.map_or_else(|| "NULL".to_string(), quote);
        self.push(column, rendered)
    }

    /// Nullable date column
    pub fn opt_date(self, column: &'static str, value: Option<NaiveDate>) -> Self {
        let rendered = value.map_or_else(|| "NULL".to_string(), |d| quote(&d.to_string()));
        self.push(column, rendered)
    }

    /// Timestamp column
    pub fn timestamp(self, column: &'static str, value: NaiveDateTime) -> Self {
        self.push(column, quote(&value.format(TIMESTAMP_FORMAT).to_string()))
    }

    /// Finish the statement, including the terminator and newline
    pub fn finish(self) -> String {
        let columns = self
            .columns
            .iter()
            .map(|c| format!("`{}`", c))
            .collect::<Vec<_>>()
            .join(",");
        format!(
            "INSERT INTO `{}`.`{}` ({}) VALUES ({});\n",
            SCHEMA,
            self.table,
            columns,
            self.values.join(",")
        )
    }
}

/// Quote a text value, doubling embedded quotes and escaping backslashes
/// and line breaks
fn quote(value: &str) -> String {
    // backslashes first, so the escapes added below stay unambiguous
    let escaped = value
        .replace('\\', "\\\\")
        .replace('"', "\"\"")
        .replace('\r', "\\r")
        .replace('\n', "\\n");
    format!("\"{}\"", escaped)
}
