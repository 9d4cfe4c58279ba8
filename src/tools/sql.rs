//! `execute_sql`: runs one raw statement against the local SQLite database.
//!
//! Each call opens its own connection and drops it before returning, on
//! success and error alike. SQLite allows a single writer, so a connection
//! left open would hold its lock past the call.

use super::{parse_args, Tool, FAILURE, SUCCESS};
use async_trait::async_trait;
use rusqlite::types::ValueRef;
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

const NAME: &str = "execute_sql";

#[derive(Debug, Deserialize)]
struct SqlArgs {
    query: String,
}

/// Executes statements against a fixed database file.
pub struct SqlTool {
    path: PathBuf,
}

impl SqlTool {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Run a statement and describe the outcome.
    #[instrument(skip(self))]
    pub async fn execute(&self, query: &str) -> String {
        let path = self.path.clone();
        let query = query.to_string();

        match tokio::task::spawn_blocking(move || run_statement(&path, &query)).await {
            Ok(Ok(message)) => message,
            Ok(Err(e)) => format!("{} SQL error: {}", FAILURE, e),
            Err(e) => format!("{} Error executing SQL: {}", FAILURE, e),
        }
    }
}

/// Whether the statement reads rows: a case-insensitive `SELECT` prefix.
pub fn is_read_query(query: &str) -> bool {
    query
        .trim()
        .get(..6)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("SELECT"))
}

fn run_statement(path: &Path, query: &str) -> rusqlite::Result<String> {
    let conn = Connection::open(path)?;

    if is_read_query(query) {
        let rows = {
            let mut stmt = conn.prepare(query)?;
            let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
            let rows = stmt
                .query_map([], |row| {
                    columns
                        .iter()
                        .enumerate()
                        .map(|(i, name)| Ok::<_, rusqlite::Error>((name.clone(), to_json(row.get_ref(i)?))))
                        .collect::<rusqlite::Result<Vec<_>>>()
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            rows
        };

        debug!("Query returned {} row(s)", rows.len());

        if rows.is_empty() {
            return Ok(format!(
                "{} Query executed successfully. No results found.",
                SUCCESS
            ));
        }

        let mut out = format!("{} Found {} result(s):\n", SUCCESS, rows.len());
        for row in &rows {
            out.push_str("  ");
            out.push_str(&format_row(row));
            out.push('\n');
        }
        Ok(out)
    } else {
        // Autocommit: each statement commits on its own once fully stepped.
        // Rows from PRAGMA or RETURNING are drained and not reported.
        let mut stmt = conn.prepare(query)?;
        let mut rows = stmt.raw_query();
        while rows.next()?.is_some() {}
        drop(rows);
        drop(stmt);

        let affected = conn.changes();
        debug!("Statement affected {} row(s)", affected);

        Ok(format!(
            "{} Query executed successfully. {} row(s) affected.",
            SUCCESS, affected
        ))
    }
}

fn to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::String(format!("<blob {} bytes>", b.len())),
    }
}

/// Render a row as a mapping, keeping column order.
fn format_row(row: &[(String, Value)]) -> String {
    let fields = row
        .iter()
        .map(|(name, value)| format!("{}: {}", Value::String(name.clone()), value))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{{{}}}", fields)
}

#[async_trait]
impl Tool for SqlTool {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Execute a SQL statement on the local SQLite database. \
        Supports SELECT, INSERT, UPDATE and DELETE. SELECT returns matching rows; \
        other statements return the number of affected rows."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The SQL statement to execute"
                }
            },
            "required": ["query"]
        })
    }

    async fn invoke(&self, args: Value) -> String {
        match parse_args::<SqlArgs>(NAME, args) {
            Ok(args) => self.execute(&args.query).await,
            Err(failure) => failure,
        }
    }
}
