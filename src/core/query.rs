//! Composable query handles
//!
//! A [`Query`] describes rows of one model table: joins, predicates,
//! ordering and a slice window. Nothing touches the session until one of the
//! terminal methods (`all`, `one`, `first`, `count`) runs, so filters and
//! paginators can pass a query along and narrow it freely.

use crate::core::error::QueryError;
use crate::core::model::Model;
use crate::core::session::Session;
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// A column reference, optionally qualified by a joined table
///
/// `Column::from("name")` targets the query's own table, while
/// `Column::from("company.name")` targets the `company` row joined in with
/// [`Query::join`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Column {
    table: Option<String>,
    name: String,
}

impl Column {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            table: None,
            name: name.into(),
        }
    }

    pub fn qualified(table: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            table: Some(table.into()),
            name: name.into(),
        }
    }

    /// Column name without the table qualifier
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    /// Find this column's value in a row of `base_table`
    fn resolve<'a>(&self, row: &'a Value, base_table: &str) -> Option<&'a Value> {
        match &self.table {
            Some(table) if table != base_table => {
                row.get(table).and_then(|joined| joined.get(&self.name))
            }
            _ => row.get(&self.name),
        }
    }
}

impl From<&str> for Column {
    fn from(value: &str) -> Self {
        match value.split_once('.') {
            Some((table, name)) => Column::qualified(table, name),
            None => Column::new(value),
        }
    }
}

impl From<String> for Column {
    fn from(value: String) -> Self {
        Column::from(value.as_str())
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.table {
            Some(table) => write!(f, "{}.{}", table, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    /// Case-insensitive substring match
    Contains,
}

/// A row predicate
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Compare {
        column: Column,
        op: Operator,
        value: Value,
    },
    /// Matches when any inner predicate matches
    Any(Vec<Predicate>),
    /// Matches when every inner predicate matches
    All(Vec<Predicate>),
}

impl Predicate {
    pub fn compare(column: impl Into<Column>, op: Operator, value: impl Into<Value>) -> Self {
        Predicate::Compare {
            column: column.into(),
            op,
            value: value.into(),
        }
    }

    pub fn eq(column: impl Into<Column>, value: impl Into<Value>) -> Self {
        Self::compare(column, Operator::Eq, value)
    }

    pub fn contains(column: impl Into<Column>, value: impl Into<Value>) -> Self {
        Self::compare(column, Operator::Contains, value)
    }

    pub fn any(predicates: Vec<Predicate>) -> Self {
        Predicate::Any(predicates)
    }

    fn matches(&self, row: &Value, base_table: &str) -> bool {
        match self {
            Predicate::Compare { column, op, value } => {
                let Some(actual) = column.resolve(row, base_table) else {
                    return *op == Operator::Ne;
                };
                match op {
                    Operator::Eq => compare_values(actual, value) == Some(Ordering::Equal),
                    Operator::Ne => compare_values(actual, value) != Some(Ordering::Equal),
                    Operator::Gt => compare_values(actual, value) == Some(Ordering::Greater),
                    Operator::Gte => matches!(
                        compare_values(actual, value),
                        Some(Ordering::Greater | Ordering::Equal)
                    ),
                    Operator::Lt => compare_values(actual, value) == Some(Ordering::Less),
                    Operator::Lte => matches!(
                        compare_values(actual, value),
                        Some(Ordering::Less | Ordering::Equal)
                    ),
                    Operator::Contains => {
                        text_of(actual).to_lowercase().contains(&text_of(value).to_lowercase())
                    }
                }
            }
            Predicate::Any(inner) => inner.iter().any(|p| p.matches(row, base_table)),
            Predicate::All(inner) => inner.iter().all(|p| p.matches(row, base_table)),
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone)]
struct Join {
    table: String,
    local: String,
    remote: String,
}

/// Compare two JSON values, coercing request strings to the row's type
///
/// Query-string and URL values always arrive as strings, so `"1"` must equal
/// the integer column value `1`.
fn compare_values(actual: &Value, expected: &Value) -> Option<Ordering> {
    match (actual, expected) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::Number(a), Value::String(b)) => {
            a.as_f64()?.partial_cmp(&b.trim().parse::<f64>().ok()?)
        }
        (Value::String(a), Value::Number(b)) => {
            a.trim().parse::<f64>().ok()?.partial_cmp(&b.as_f64()?)
        }
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::String(b)) => Some(a.cmp(&b.parse::<bool>().ok()?)),
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        _ => None,
    }
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// An unexecuted query over rows of model `M`
pub struct Query<M> {
    session: Arc<dyn Session>,
    table: &'static str,
    joins: Vec<Join>,
    predicates: Vec<Predicate>,
    ordering: Vec<(Column, Direction)>,
    offset: usize,
    limit: Option<usize>,
    _model: PhantomData<fn() -> M>,
}

impl<M> Clone for Query<M> {
    fn clone(&self) -> Self {
        Self {
            session: self.session.clone(),
            table: self.table,
            joins: self.joins.clone(),
            predicates: self.predicates.clone(),
            ordering: self.ordering.clone(),
            offset: self.offset,
            limit: self.limit,
            _model: PhantomData,
        }
    }
}

impl<M> fmt::Debug for Query<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("table", &self.table)
            .field("joins", &self.joins)
            .field("predicates", &self.predicates)
            .field("ordering", &self.ordering)
            .field("offset", &self.offset)
            .field("limit", &self.limit)
            .finish()
    }
}

impl<M: Model> Query<M> {
    /// A query over every row of `M`'s table
    pub fn new(session: Arc<dyn Session>) -> Self {
        Self {
            session,
            table: M::table_name(),
            joins: Vec::new(),
            predicates: Vec::new(),
            ordering: Vec::new(),
            offset: 0,
            limit: None,
            _model: PhantomData,
        }
    }

    /// The table this query is scoped to
    pub fn table(&self) -> &'static str {
        self.table
    }

    pub fn session(&self) -> &Arc<dyn Session> {
        &self.session
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// Narrow the query; predicates combine with AND
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Equality shorthand for [`filter`](Self::filter)
    pub fn filter_by(self, column: impl Into<Column>, value: impl Into<Value>) -> Self {
        self.filter(Predicate::eq(column, value))
    }

    /// Inner join `table` where `table.remote == self.local`
    ///
    /// The matching row is embedded under the joined table's name, making
    /// its columns reachable as `table.column`.
    pub fn join(
        mut self,
        table: impl Into<String>,
        local: impl Into<String>,
        remote: impl Into<String>,
    ) -> Self {
        self.joins.push(Join {
            table: table.into(),
            local: local.into(),
            remote: remote.into(),
        });
        self
    }

    pub fn order_by(mut self, column: impl Into<Column>, direction: Direction) -> Self {
        self.ordering.push((column.into(), direction));
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Joined, filtered and ordered rows, before slicing
    fn matched_rows(&self) -> Result<Vec<Value>, QueryError> {
        let mut rows = self.session.rows(self.table)?;

        for join in &self.joins {
            let others = self.session.rows(&join.table)?;
            rows = rows
                .into_iter()
                .filter_map(|mut row| {
                    let local = row.get(&join.local)?.clone();
                    let matched = others.iter().find(|other| {
                        other
                            .get(&join.remote)
                            .is_some_and(|remote| compare_values(remote, &local) == Some(Ordering::Equal))
                    })?;
                    row.as_object_mut()?
                        .insert(join.table.clone(), matched.clone());
                    Some(row)
                })
                .collect();
        }

        rows.retain(|row| self.predicates.iter().all(|p| p.matches(row, self.table)));

        if !self.ordering.is_empty() {
            rows.sort_by(|a, b| {
                for (column, direction) in &self.ordering {
                    let ordering = match (column.resolve(a, self.table), column.resolve(b, self.table)) {
                        (Some(x), Some(y)) => compare_values(x, y).unwrap_or(Ordering::Equal),
                        (None, Some(_)) => Ordering::Less,
                        (Some(_), None) => Ordering::Greater,
                        (None, None) => Ordering::Equal,
                    };
                    let ordering = match direction {
                        Direction::Asc => ordering,
                        Direction::Desc => ordering.reverse(),
                    };
                    if ordering != Ordering::Equal {
                        return ordering;
                    }
                }
                Ordering::Equal
            });
        }

        Ok(rows)
    }

    fn sliced_rows(&self) -> Result<Vec<Value>, QueryError> {
        let rows = self.matched_rows()?.into_iter().skip(self.offset);
        Ok(match self.limit {
            Some(limit) => rows.take(limit).collect(),
            None => rows.collect(),
        })
    }

    fn decode(&self, row: Value) -> Result<M, QueryError> {
        serde_json::from_value(row).map_err(|e| QueryError::Decode {
            table: self.table.to_string(),
            message: e.to_string(),
        })
    }

    /// Execute and return every matching row
    pub fn all(&self) -> Result<Vec<M>, QueryError> {
        self.sliced_rows()?
            .into_iter()
            .map(|row| self.decode(row))
            .collect()
    }

    /// Execute and require exactly one matching row
    pub fn one(&self) -> Result<M, QueryError> {
        let mut rows = self.sliced_rows()?;
        match rows.len() {
            0 => Err(QueryError::NoResultFound {
                table: self.table.to_string(),
            }),
            1 => self.decode(rows.remove(0)),
            _ => Err(QueryError::MultipleResultsFound {
                table: self.table.to_string(),
            }),
        }
    }

    /// Execute and return the first matching row, if any
    pub fn first(&self) -> Result<Option<M>, QueryError> {
        self.sliced_rows()?
            .into_iter()
            .next()
            .map(|row| self.decode(row))
            .transpose()
    }

    /// Number of matching rows, ignoring offset and limit
    pub fn count(&self) -> Result<usize, QueryError> {
        Ok(self.matched_rows()?.len())
    }
}
