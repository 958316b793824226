//! GenericApiView: the request-scoped helper every generic endpoint builds on
//!
//! A `GenericApiView` pairs a shared [`ViewConfig`] with one request. It
//! resolves the base query, runs the configured filter backends, paginates,
//! fetches single objects by their lookup column and hands out schemas bound
//! to the request.

use crate::core::error::{QueryError, ViewError, ViewResult};
use crate::core::model::Model;
use crate::core::query::{Predicate, Query};
use crate::core::request::ApiRequest;
use crate::views::config::ViewConfig;
use crate::views::pagination::Pagination;
use crate::views::schema::{Schema, SchemaClass, SchemaContext};
use axum::response::Response;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::sync::Arc;

/// A generic view bound to one request
pub struct GenericApiView<M: Model> {
    config: Arc<ViewConfig<M>>,
    request: ApiRequest,
    lookup_url_kwargs: IndexMap<String, String>,
    paginator: Option<Option<Box<dyn Pagination<M>>>>,
}

impl<M: Model> GenericApiView<M> {
    pub fn new(config: Arc<ViewConfig<M>>, request: ApiRequest) -> Self {
        Self {
            config,
            request,
            lookup_url_kwargs: IndexMap::new(),
            paginator: None,
        }
    }

    /// URL keyword arguments used by [`get_object`](Self::get_object)
    pub fn with_lookup_url_kwargs(mut self, kwargs: IndexMap<String, String>) -> Self {
        self.lookup_url_kwargs = kwargs;
        self
    }

    pub fn config(&self) -> &ViewConfig<M> {
        &self.config
    }

    pub fn request(&self) -> &ApiRequest {
        &self.request
    }

    pub fn lookup_url_kwargs(&self) -> &IndexMap<String, String> {
        &self.lookup_url_kwargs
    }

    /// The query this view works from
    ///
    /// Uses the configured query resolver when there is one, otherwise every
    /// row of the model from the request's session. A view with neither is
    /// misconfigured.
    pub fn get_query(&self) -> ViewResult<Query<M>> {
        if let Some(resolver) = self.config.query_resolver() {
            return resolver(&self.request);
        }

        if self.config.model().is_none() {
            let err = ViewError::improperly_configured(
                self.config.name(),
                "should include a `model`, or a query resolver in place of `get_query()`",
            );
            tracing::error!("{}", err);
            return Err(err);
        }

        tracing::debug!(view = self.config.name(), table = M::table_name(), "default query");
        Ok(Query::new(self.request.dbsession().clone()))
    }

    /// Run every configured filter backend over `query`, in order
    pub fn filter_query(&self, query: Query<M>) -> ViewResult<Query<M>> {
        self.config
            .filter_backends()
            .iter()
            .try_fold(query, |query, backend| {
                backend.filter_query(&self.request, query, self)
            })
    }

    /// The paginator for this view instance, or `None` if pagination is off
    ///
    /// Created on first use and kept for the rest of the request, so the page
    /// state recorded by `paginate_query` is there for the response.
    pub fn paginator(&mut self) -> Option<&mut Box<dyn Pagination<M>>> {
        let config = &self.config;
        self.paginator
            .get_or_insert_with(|| config.pagination_class().map(|class| class()))
            .as_mut()
    }

    /// One page of rows, or `None` without doing anything if pagination is off
    pub fn paginate_query(&mut self, query: Query<M>) -> ViewResult<Option<Vec<M>>> {
        let request = self.request.clone();
        match self.paginator() {
            Some(paginator) => paginator.paginate_query(query, &request).map(Some),
            None => Ok(None),
        }
    }

    /// Wrap page data in the paginator's envelope
    ///
    /// Only meaningful for views with a paginator.
    pub fn get_paginated_response(&mut self, data: Value) -> ViewResult<Response> {
        let name = self.config.name().to_string();
        match self.paginator() {
            Some(paginator) => paginator.get_paginated_response(data),
            None => Err(ViewError::improperly_configured(
                name,
                "get_paginated_response() requires a pagination class",
            )),
        }
    }

    /// Fetch the single object named by the lookup URL argument
    ///
    /// The lookup runs against the filtered query, so an object hidden by a
    /// filter is not found either.
    pub fn get_object(&self) -> ViewResult<M> {
        let query = self.filter_query(self.get_query()?)?;

        let lookup_field = self.config.lookup_field();
        let kwarg = self.config.lookup_url_kwarg();
        let value = self.lookup_url_kwargs.get(kwarg).ok_or_else(|| {
            ViewError::improperly_configured(
                self.config.name(),
                format!(
                    "expected a URL keyword argument named '{}'; fix the route or set the lookup URL kwarg",
                    kwarg
                ),
            )
        })?;

        let column = lookup_field.column();
        match query
            .filter(Predicate::eq(column.clone(), value.as_str()))
            .one()
        {
            Ok(instance) => Ok(instance),
            Err(QueryError::NoResultFound { table }) => {
                tracing::warn!(table = %table, lookup = %column, value = %value, "object not found");
                Err(ViewError::NotFound {
                    entity_type: table,
                    lookup: Some(format!("{}={}", column, value)),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// The schema class for this request
    pub fn get_schema_class(&self) -> ViewResult<SchemaClass<M>> {
        if let Some(resolver) = self.config.schema_class_resolver() {
            return resolver(&self.request);
        }

        self.config.schema_class().cloned().ok_or_else(|| {
            ViewError::improperly_configured(
                self.config.name(),
                "should include a schema class, or a schema class resolver",
            )
        })
    }

    /// Context every schema of this view receives
    pub fn get_schema_context(&self) -> SchemaContext {
        SchemaContext::new().with_request(self.request.clone())
    }

    /// A schema instance bound to the current request
    pub fn get_schema(&self) -> ViewResult<Box<dyn Schema<M>>> {
        self.get_schema_with(Map::new())
    }

    /// A schema instance with extra context; `extra` keys win
    pub fn get_schema_with(&self, extra: Map<String, Value>) -> ViewResult<Box<dyn Schema<M>>> {
        let class = self.get_schema_class()?;
        Ok(class(self.get_schema_context().merge(extra)))
    }
}
