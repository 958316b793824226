//! Filter strategies narrowing a view's query from request parameters

use crate::core::error::ViewResult;
use crate::core::model::Model;
use crate::core::query::{Column, Direction, Predicate, Query};
use crate::core::request::ApiRequest;
use crate::views::generic::GenericApiView;

/// Contract for filter strategies
///
/// Backends run in the order the view declares them, each receiving the
/// query the previous one produced.
pub trait FilterBackend<M: Model>: Send + Sync {
    fn filter_query(
        &self,
        request: &ApiRequest,
        query: Query<M>,
        view: &GenericApiView<M>,
    ) -> ViewResult<Query<M>>;
}

/// Declared column written exactly as `field`
///
/// A bare name only matches an unqualified column and `table.column` only
/// matches that qualified column.
fn find_column<'a>(columns: &'a [Column], field: &str) -> Option<&'a Column> {
    columns.iter().find(|column| column.to_string() == field)
}

/// Equality filters from `filter[<field>]=<value>` parameters
///
/// Only fields listed in the view's `filter_fields` apply; anything else is
/// ignored. Several filters combine with AND. A field written `table.column`
/// targets a table the view's query joined in.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldFilter;

impl FieldFilter {
    /// Extract `<field>` from `<prefix>[<field>]`
    fn field_name<'a>(key: &'a str, prefix: &str) -> Option<&'a str> {
        key.strip_prefix(prefix)?
            .strip_prefix('[')?
            .strip_suffix(']')
            .filter(|field| !field.is_empty())
    }
}

impl<M: Model> FilterBackend<M> for FieldFilter {
    fn filter_query(
        &self,
        request: &ApiRequest,
        mut query: Query<M>,
        view: &GenericApiView<M>,
    ) -> ViewResult<Query<M>> {
        let prefix = &request.settings().filter_query_param;

        for (key, value) in request.params() {
            let Some(field) = Self::field_name(key, prefix) else {
                continue;
            };

            match find_column(view.config().filter_fields(), field) {
                Some(column) => {
                    tracing::debug!(field = %column, value = %value, "applying field filter");
                    query = query.filter(Predicate::eq(column.clone(), value.as_str()));
                }
                None => tracing::debug!(field, "ignoring undeclared filter field"),
            }
        }

        Ok(query)
    }
}

/// Case-insensitive search across the view's `search_fields`
///
/// `search=foo bar` keeps rows where every term appears in at least one of
/// the search fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchFilter;

impl<M: Model> FilterBackend<M> for SearchFilter {
    fn filter_query(
        &self,
        request: &ApiRequest,
        mut query: Query<M>,
        view: &GenericApiView<M>,
    ) -> ViewResult<Query<M>> {
        let fields = view.config().search_fields();
        let Some(search) = request.param(&request.settings().search_query_param) else {
            return Ok(query);
        };
        if fields.is_empty() {
            return Ok(query);
        }

        for term in search.split_whitespace() {
            query = query.filter(Predicate::any(
                fields
                    .iter()
                    .map(|column| Predicate::contains(column.clone(), term))
                    .collect(),
            ));
        }

        Ok(query)
    }
}

/// Ordering from `order=name,-id`
///
/// A leading `-` sorts descending. Only columns in the view's
/// `ordering_fields` are honored.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderFilter;

impl<M: Model> FilterBackend<M> for OrderFilter {
    fn filter_query(
        &self,
        request: &ApiRequest,
        mut query: Query<M>,
        view: &GenericApiView<M>,
    ) -> ViewResult<Query<M>> {
        let Some(order) = request.param(&request.settings().order_query_param) else {
            return Ok(query);
        };

        for term in order.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            let (field, direction) = match term.strip_prefix('-') {
                Some(field) => (field, Direction::Desc),
                None => (term, Direction::Asc),
            };

            match find_column(view.config().ordering_fields(), field) {
                Some(column) => query = query.order_by(column.clone(), direction),
                None => tracing::debug!(field, "ignoring undeclared ordering field"),
            }
        }

        Ok(query)
    }
}
