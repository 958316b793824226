//! Session trait: the database collaborator views query through

use crate::core::error::QueryError;
use crate::core::model::Model;
use crate::core::query::Query;
use serde_json::Value;
use std::sync::Arc;

/// Storage session attached to every request.
///
/// Rows are JSON objects grouped by table name. Querying, filtering and
/// slicing happen in [`Query`]; a session only has to hand out rows and apply
/// writes. Connection pooling and transactions belong to the implementation.
pub trait Session: Send + Sync {
    /// All rows of a table, in insertion order
    fn rows(&self, table: &str) -> Result<Vec<Value>, QueryError>;

    /// Insert a row, assigning `key` when the row does not carry one
    ///
    /// Returns the row as stored.
    fn insert(&self, table: &str, key: &str, row: Value) -> Result<Value, QueryError>;

    /// Replace the row whose `key` column equals `value`
    fn update(&self, table: &str, key: &str, value: &Value, row: Value)
    -> Result<Value, QueryError>;

    /// Delete rows whose `key` column equals `value`, returning how many went
    fn delete(&self, table: &str, key: &str, value: &Value) -> Result<usize, QueryError>;
}

impl dyn Session {
    /// Persist a model instance and return it as stored
    pub fn add<M: Model>(&self, instance: &M) -> Result<M, QueryError> {
        let stored = self.insert(M::table_name(), M::primary_key(), instance.to_row()?)?;
        M::from_row(stored)
    }
}

/// Start a query over `M` on the given session
pub fn query<M: Model>(session: &Arc<dyn Session>) -> Query<M> {
    Query::new(session.clone())
}
