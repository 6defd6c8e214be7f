use anyhow::{Context, Result};
use log::{info, warn};
use rusqlite::Connection;

use super::schema_gen::{generate_create_table, generate_indexes};
use crate::error::ConnectionError;
use crate::schema::TableSchema;

/// The one database session shared by every file of a run.
///
/// Opened lazily on first use and reopened if it was closed. Each file takes
/// its own transaction on this connection.
pub struct Session {
    url: String,
    conn: Option<Connection>,
}

impl Session {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            conn: None,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    /// Borrow the connection, opening it first if needed
    pub fn connection(&mut self) -> Result<&mut Connection, ConnectionError> {
        let conn = match self.conn.take() {
            Some(conn) => conn,
            None => {
                let conn = open(&self.url)?;
                info!("Database connection established: {}", self.url);
                conn
            }
        };
        Ok(self.conn.insert(conn))
    }

    /// Close the connection. The next `connection()` call reopens it.
    pub fn close(&mut self) {
        if let Some(conn) = self.conn.take() {
            if let Err((_conn, e)) = conn.close() {
                warn!("Failed to close database connection cleanly: {}", e);
            }
        }
    }

    /// Create any missing tables (and their FK indexes)
    pub fn create_tables(&mut self, schemas: &[&TableSchema]) -> Result<()> {
        info!("Creating {} tables...", schemas.len());
        let conn = self.connection()?;

        for schema in schemas {
            let sql = generate_create_table(schema);
            conn.execute(&sql, [])
                .with_context(|| format!("Failed to create table: {}", schema.name))?;

            for index_sql in generate_indexes(schema) {
                conn.execute(&index_sql, [])
                    .with_context(|| format!("Failed to create index for: {}", schema.name))?;
            }
        }

        Ok(())
    }
}

fn open(url: &str) -> Result<Connection, ConnectionError> {
    let conn = Connection::open(url).map_err(|source| ConnectionError {
        url: url.to_string(),
        source,
    })?;

    // Child rows must point at loaded parents
    conn.execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(|source| ConnectionError {
            url: url.to_string(),
            source,
        })?;

    Ok(conn)
}
