//! In-memory implementation of Session for testing and development

use crate::core::error::QueryError;
use crate::core::session::Session;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// In-memory session
///
/// Useful for testing and development. Uses RwLock for thread-safe access.
/// Rows missing their key column on insert get the next integer key.
#[derive(Clone, Default)]
pub struct InMemorySession {
    tables: Arc<RwLock<HashMap<String, Vec<Value>>>>,
}

impl InMemorySession {
    /// Create a new, empty in-memory session
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the rows of a table
    pub fn seed(&self, table: &str, rows: Vec<Value>) {
        let mut tables = match self.tables.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        tables.insert(table.to_string(), rows);
    }
}

fn key_matches(row: &Value, key: &str, value: &Value) -> bool {
    match (row.get(key), value) {
        (Some(Value::Number(a)), Value::Number(b)) => a.as_f64() == b.as_f64(),
        (Some(actual), expected) => actual == expected,
        (None, _) => false,
    }
}

fn next_key(rows: &[Value], key: &str) -> i64 {
    rows.iter()
        .filter_map(|row| row.get(key).and_then(Value::as_i64))
        .max()
        .unwrap_or(0)
        + 1
}

impl Session for InMemorySession {
    fn rows(&self, table: &str) -> Result<Vec<Value>, QueryError> {
        let tables = self
            .tables
            .read()
            .map_err(|e| QueryError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(tables.get(table).cloned().unwrap_or_default())
    }

    fn insert(&self, table: &str, key: &str, mut row: Value) -> Result<Value, QueryError> {
        let mut tables = self
            .tables
            .write()
            .map_err(|e| QueryError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        let rows = tables.entry(table.to_string()).or_default();
        let object = row
            .as_object_mut()
            .ok_or_else(|| QueryError::Storage(format!("{} rows must be JSON objects", table)))?;

        if object.get(key).is_none_or(Value::is_null) {
            object.insert(key.to_string(), Value::from(next_key(rows, key)));
        }

        rows.push(row.clone());

        Ok(row)
    }

    fn update(
        &self,
        table: &str,
        key: &str,
        value: &Value,
        row: Value,
    ) -> Result<Value, QueryError> {
        let mut tables = self
            .tables
            .write()
            .map_err(|e| QueryError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        let slot = tables
            .get_mut(table)
            .and_then(|rows| rows.iter_mut().find(|r| key_matches(r, key, value)))
            .ok_or_else(|| QueryError::NoResultFound {
                table: table.to_string(),
            })?;

        *slot = row.clone();

        Ok(row)
    }

    fn delete(&self, table: &str, key: &str, value: &Value) -> Result<usize, QueryError> {
        let mut tables = self
            .tables
            .write()
            .map_err(|e| QueryError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        let Some(rows) = tables.get_mut(table) else {
            return Ok(0);
        };
        let before = rows.len();
        rows.retain(|r| !key_matches(r, key, value));

        Ok(before - rows.len())
    }
}
