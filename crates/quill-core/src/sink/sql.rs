//! SQLite documentation tables

use std::path::Path;

use rusqlite::{params_from_iter, Connection};
use tracing::{debug, warn};

use super::DocSink;
use crate::error::SinkError;
use crate::model::{Event, Function, Script};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS scripts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    extends TEXT,
    summary TEXT
);
CREATE TABLE IF NOT EXISTS functions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    script_name TEXT NOT NULL,
    name TEXT NOT NULL,
    return_type TEXT,
    params TEXT,
    flags TEXT,
    description TEXT
);
CREATE TABLE IF NOT EXISTS events (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    script_name TEXT NOT NULL,
    name TEXT NOT NULL,
    params TEXT,
    description TEXT
);
CREATE TABLE IF NOT EXISTS misc_pages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    content TEXT
);
";

/// Batching settings for [`SqlSink`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlOptions {
    /// Buffer rows per table and insert them in one transaction
    pub batch: bool,
    /// Rows buffered per table before a flush
    pub batch_size: usize,
    /// Tag attached to flush log lines
    pub batch_id: Option<String>,
}

impl Default for SqlOptions {
    fn default() -> Self {
        Self {
            batch: false,
            batch_size: 500,
            batch_id: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Table {
    Scripts,
    Functions,
    Events,
    MiscPages,
}

impl Table {
    const ALL: [Table; 4] = [Table::Scripts, Table::Functions, Table::Events, Table::MiscPages];

    fn name(self) -> &'static str {
        match self {
            Table::Scripts => "scripts",
            Table::Functions => "functions",
            Table::Events => "events",
            Table::MiscPages => "misc_pages",
        }
    }

    fn insert_sql(self) -> &'static str {
        match self {
            Table::Scripts => "INSERT INTO scripts (name, extends, summary) VALUES (?1, ?2, ?3)",
            Table::Functions => {
                "INSERT INTO functions (script_name, name, return_type, params, flags, description) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)"
            }
            Table::Events => {
                "INSERT INTO events (script_name, name, params, description) VALUES (?1, ?2, ?3, ?4)"
            }
            Table::MiscPages => "INSERT INTO misc_pages (title, content) VALUES (?1, ?2)",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

type Row = Vec<String>;

/// Stores entity fields in four SQLite tables.
///
/// Without batching every write is its own statement. With batching rows
/// are buffered per table and flushed in a transaction once a table holds
/// `batch_size` rows; a failed flush rolls back that batch only. The
/// buffer is cleared whether the flush succeeds or not.
pub struct SqlSink {
    conn: Option<Connection>,
    options: SqlOptions,
    buffers: [Vec<Row>; 4],
}

impl SqlSink {
    /// Open (or create) a database file.
    pub fn open(path: &Path, options: SqlOptions) -> Result<Self, SinkError> {
        let conn = Connection::open(path)
            .map_err(|e| SinkError::database(format!("open '{}'", path.display()), e))?;
        Self::from_connection(conn, options)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory(options: SqlOptions) -> Result<Self, SinkError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| SinkError::database("open in-memory database", e))?;
        Self::from_connection(conn, options)
    }

    /// Use an existing connection, creating the tables if needed.
    pub fn from_connection(conn: Connection, options: SqlOptions) -> Result<Self, SinkError> {
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
            .map_err(|e| SinkError::database("check connection", e))?;
        conn.execute_batch(SCHEMA)
            .map_err(|e| SinkError::database("create schema", e))?;
        debug!(batch = options.batch, batch_size = options.batch_size, "sql sink ready");
        Ok(Self {
            conn: Some(conn),
            options: SqlOptions {
                batch_size: options.batch_size.max(1),
                ..options
            },
            buffers: Default::default(),
        })
    }

    pub fn options(&self) -> &SqlOptions {
        &self.options
    }

    /// The open connection, `None` once finalized
    pub fn connection(&self) -> Option<&Connection> {
        self.conn.as_ref()
    }

    /// Rows waiting in batch buffers
    pub fn pending_rows(&self) -> usize {
        self.buffers.iter().map(Vec::len).sum()
    }

    /// Flush every batch buffer now.
    pub fn flush_all(&mut self) -> Result<(), SinkError> {
        let mut first_error = None;
        for table in Table::ALL {
            if let Err(e) = self.flush_table(table) {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    fn insert(&mut self, table: Table, row: Row) -> Result<(), SinkError> {
        let conn = self
            .conn
            .as_ref()
            .ok_or(SinkError::AlreadyFinalized { sink: "sql" })?;

        if !self.options.batch {
            conn.execute(table.insert_sql(), params_from_iter(row.iter()))
                .map_err(|e| SinkError::database(format!("insert into {}", table.name()), e))?;
            return Ok(());
        }

        let buffer = &mut self.buffers[table.index()];
        buffer.push(row);
        if buffer.len() >= self.options.batch_size {
            self.flush_table(table)?;
        }
        Ok(())
    }

    fn flush_table(&mut self, table: Table) -> Result<(), SinkError> {
        let rows = std::mem::take(&mut self.buffers[table.index()]);
        if rows.is_empty() {
            return Ok(());
        }
        let conn = self
            .conn
            .as_mut()
            .ok_or(SinkError::AlreadyFinalized { sink: "sql" })?;
        let operation = || format!("flush {}", table.name());

        let tx = conn
            .transaction()
            .map_err(|e| SinkError::database(operation(), e))?;
        {
            let mut stmt = tx
                .prepare_cached(table.insert_sql())
                .map_err(|e| SinkError::database(operation(), e))?;
            for row in &rows {
                stmt.execute(params_from_iter(row.iter()))
                    .map_err(|e| SinkError::database(operation(), e))?;
            }
        }
        tx.commit().map_err(|e| SinkError::database(operation(), e))?;

        debug!(
            table = table.name(),
            rows = rows.len(),
            batch_id = self.options.batch_id.as_deref().unwrap_or("-"),
            "flushed batch"
        );
        Ok(())
    }
}

impl DocSink for SqlSink {
    fn kind(&self) -> &'static str {
        "sql"
    }

    fn write_script(&mut self, script: &Script) -> Result<(), SinkError> {
        let summary = format!(
            "{} funcs, {} events",
            script.functions.len(),
            script.events.len()
        );
        self.insert(
            Table::Scripts,
            vec![script.name.clone(), script.extends.clone(), summary],
        )
    }

    fn write_function(&mut self, script_name: &str, function: &Function) -> Result<(), SinkError> {
        self.insert(
            Table::Functions,
            vec![
                script_name.to_string(),
                function.name.clone(),
                function.return_type.clone(),
                function.params.clone(),
                function.flags.clone(),
                function.description.clone(),
            ],
        )
    }

    fn write_event(&mut self, script_name: &str, event: &Event) -> Result<(), SinkError> {
        self.insert(
            Table::Events,
            vec![
                script_name.to_string(),
                event.name.clone(),
                event.params.clone(),
                event.description.clone(),
            ],
        )
    }

    fn write_misc(&mut self, title: &str, text: &str) -> Result<(), SinkError> {
        self.insert(Table::MiscPages, vec![title.to_string(), text.to_string()])
    }

    fn finalize(&mut self) -> Result<(), SinkError> {
        if self.conn.is_none() {
            return Ok(());
        }

        let mut result = self.flush_all();

        if let Some(conn) = self.conn.take() {
            if let Err((conn, e)) = conn.close() {
                drop(conn);
                if result.is_ok() {
                    result = Err(SinkError::database("close database", e));
                } else {
                    warn!(error = %e, "failed to close database after flush error");
                }
            }
        }

        debug!(batch_id = self.options.batch_id.as_deref().unwrap_or("-"), "sql sink finalized");
        result
    }
}

impl Drop for SqlSink {
    fn drop(&mut self) {
        if self.conn.is_some() {
            if let Err(e) = self.finalize() {
                warn!(error = %e, "sql sink finalize on drop failed");
            }
        }
    }
}
