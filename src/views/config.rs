//! Per-view configuration

use crate::config::{ApiSettings, PaginationStyle};
use crate::core::error::ViewResult;
use crate::core::model::Model;
use crate::core::query::{Column, Query};
use crate::core::request::{ApiRequest, ViewArgs};
use crate::views::filters::FilterBackend;
use crate::views::generic::GenericApiView;
use crate::views::pagination::{LinkHeaderPagination, PageNumberPagination, Pagination};
use crate::views::schema::SchemaClass;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Replaces the default `get_query()`
pub type QueryResolver<M> = Arc<dyn Fn(&ApiRequest) -> ViewResult<Query<M>> + Send + Sync>;

/// Replaces the configured schema class, e.g. to pick one per request
pub type SchemaClassResolver<M> =
    Arc<dyn Fn(&ApiRequest) -> ViewResult<SchemaClass<M>> + Send + Sync>;

/// Builds a fresh paginator for each view instance
pub type PaginationClass<M> = Arc<dyn Fn() -> Box<dyn Pagination<M>> + Send + Sync>;

/// Column used to fetch a single object
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupField {
    /// A column of the view's model
    Column(String),
    /// A column of another table joined into the view's query
    Related { table: String, column: String },
}

impl LookupField {
    pub fn column(&self) -> Column {
        match self {
            LookupField::Column(name) => Column::new(name.as_str()),
            LookupField::Related { table, column } => {
                Column::qualified(table.as_str(), column.as_str())
            }
        }
    }

    /// The URL keyword argument carrying the lookup value by default
    pub fn url_kwarg(&self) -> &str {
        match self {
            LookupField::Column(name) => name,
            LookupField::Related { column, .. } => column,
        }
    }
}

/// Configuration of a generic view over model `M`
///
/// Built once per endpoint and shared by every request through an `Arc`.
///
/// # Example
///
/// ```rust,ignore
/// let config = Arc::new(
///     ViewConfig::<User>::for_model()
///         .named("UserApiView")
///         .with_schema_class(ModelSchema::<User>::class())
///         .with_filter(FieldFilter)
///         .with_filter_fields(["name"]),
/// );
/// ```
pub struct ViewConfig<M: Model> {
    name: String,
    model: Option<&'static str>,
    query_resolver: Option<QueryResolver<M>>,
    schema_class: Option<SchemaClass<M>>,
    schema_class_resolver: Option<SchemaClassResolver<M>>,
    pagination_class: Option<PaginationClass<M>>,
    filter_backends: Vec<Arc<dyn FilterBackend<M>>>,
    filter_fields: Vec<Column>,
    search_fields: Vec<Column>,
    ordering_fields: Vec<Column>,
    lookup_field: LookupField,
    lookup_url_kwarg: Option<String>,
    _model: PhantomData<fn() -> M>,
}

impl<M: Model> ViewConfig<M> {
    /// A configuration with no model: `get_query` needs a resolver
    pub fn new() -> Self {
        Self {
            name: "GenericApiView".to_string(),
            model: None,
            query_resolver: None,
            schema_class: None,
            schema_class_resolver: None,
            pagination_class: None,
            filter_backends: Vec::new(),
            filter_fields: Vec::new(),
            search_fields: Vec::new(),
            ordering_fields: Vec::new(),
            lookup_field: LookupField::Column(M::primary_key().to_string()),
            lookup_url_kwarg: None,
            _model: PhantomData,
        }
    }

    /// A configuration querying `M`'s table by default
    pub fn for_model() -> Self {
        Self {
            model: Some(M::table_name()),
            ..Self::new()
        }
    }

    /// A model configuration using the settings' default pagination
    pub fn from_settings(settings: &ApiSettings) -> Self {
        let config = Self::for_model();
        match settings.default_pagination {
            PaginationStyle::None => config,
            PaginationStyle::PageNumber => {
                config.with_pagination_class(Arc::new(|| -> Box<dyn Pagination<M>> {
                    Box::new(PageNumberPagination::new())
                }))
            }
            PaginationStyle::LinkHeader => {
                config.with_pagination_class(Arc::new(|| -> Box<dyn Pagination<M>> {
                    Box::new(LinkHeaderPagination::new())
                }))
            }
        }
    }

    /// Name used in configuration error messages
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_query<F>(mut self, resolver: F) -> Self
    where
        F: Fn(&ApiRequest) -> ViewResult<Query<M>> + Send + Sync + 'static,
    {
        self.query_resolver = Some(Arc::new(resolver));
        self
    }

    pub fn with_schema_class(mut self, class: SchemaClass<M>) -> Self {
        self.schema_class = Some(class);
        self
    }

    pub fn with_schema_class_resolver<F>(mut self, resolver: F) -> Self
    where
        F: Fn(&ApiRequest) -> ViewResult<SchemaClass<M>> + Send + Sync + 'static,
    {
        self.schema_class_resolver = Some(Arc::new(resolver));
        self
    }

    pub fn with_pagination_class(mut self, class: PaginationClass<M>) -> Self {
        self.pagination_class = Some(class);
        self
    }

    /// Build paginators by cloning a prototype
    pub fn with_paginator<P>(self, prototype: P) -> Self
    where
        P: Pagination<M> + Clone + 'static,
    {
        self.with_pagination_class(Arc::new(move || -> Box<dyn Pagination<M>> {
            Box::new(prototype.clone())
        }))
    }

    pub fn without_pagination(mut self) -> Self {
        self.pagination_class = None;
        self
    }

    /// Append a filter backend; backends run in the order added
    pub fn with_filter(mut self, backend: impl FilterBackend<M> + 'static) -> Self {
        self.filter_backends.push(Arc::new(backend));
        self
    }

    pub fn with_filter_fields<I, C>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Column>,
    {
        self.filter_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_search_fields<I, C>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Column>,
    {
        self.search_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_ordering_fields<I, C>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Column>,
    {
        self.ordering_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_lookup_field(mut self, lookup_field: LookupField) -> Self {
        self.lookup_field = lookup_field;
        self
    }

    /// Read the lookup value from a differently named URL argument
    pub fn with_lookup_url_kwarg(mut self, kwarg: impl Into<String>) -> Self {
        self.lookup_url_kwarg = Some(kwarg.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Table of the configured model, if any
    pub fn model(&self) -> Option<&'static str> {
        self.model
    }

    pub fn query_resolver(&self) -> Option<&QueryResolver<M>> {
        self.query_resolver.as_ref()
    }

    pub fn schema_class(&self) -> Option<&SchemaClass<M>> {
        self.schema_class.as_ref()
    }

    pub fn schema_class_resolver(&self) -> Option<&SchemaClassResolver<M>> {
        self.schema_class_resolver.as_ref()
    }

    pub fn pagination_class(&self) -> Option<&PaginationClass<M>> {
        self.pagination_class.as_ref()
    }

    pub fn filter_backends(&self) -> &[Arc<dyn FilterBackend<M>>] {
        &self.filter_backends
    }

    pub fn filter_fields(&self) -> &[Column] {
        &self.filter_fields
    }

    pub fn search_fields(&self) -> &[Column] {
        &self.search_fields
    }

    pub fn ordering_fields(&self) -> &[Column] {
        &self.ordering_fields
    }

    pub fn lookup_field(&self) -> &LookupField {
        &self.lookup_field
    }

    /// URL keyword argument holding the lookup value
    pub fn lookup_url_kwarg(&self) -> &str {
        self.lookup_url_kwarg
            .as_deref()
            .unwrap_or_else(|| self.lookup_field.url_kwarg())
    }

    /// Create the request-scoped view for this configuration
    pub fn bind(self: &Arc<Self>, request: ApiRequest, args: &ViewArgs) -> GenericApiView<M> {
        GenericApiView::new(self.clone(), request).with_lookup_url_kwargs(args.kwargs.clone())
    }
}

impl<M: Model> Default for ViewConfig<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Model> fmt::Debug for ViewConfig<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewConfig")
            .field("name", &self.name)
            .field("model", &self.model)
            .field("has_query_resolver", &self.query_resolver.is_some())
            .field("has_schema_class", &self.schema_class.is_some())
            .field("has_pagination_class", &self.pagination_class.is_some())
            .field("filter_backends", &self.filter_backends.len())
            .field("filter_fields", &self.filter_fields)
            .field("lookup_field", &self.lookup_field)
            .field("lookup_url_kwarg", &self.lookup_url_kwarg)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, Serialize, Deserialize)]
    struct Tag {
        slug: String,
    }

    impl Model for Tag {
        fn table_name() -> &'static str {
            "tag"
        }

        fn primary_key() -> &'static str {
            "slug"
        }
    }

    #[test]
    fn test_new_has_no_model() {
        let config = ViewConfig::<Tag>::new();
        assert_eq!(config.model(), None);
        assert!(config.pagination_class().is_none());
        assert!(config.filter_backends().is_empty());
    }

    #[test]
    fn test_lookup_defaults_to_primary_key() {
        let config = ViewConfig::<Tag>::for_model();
        assert_eq!(config.model(), Some("tag"));
        assert_eq!(config.lookup_field(), &LookupField::Column("slug".to_string()));
        assert_eq!(config.lookup_url_kwarg(), "slug");
    }

    #[test]
    fn test_lookup_url_kwarg_override() {
        let config = ViewConfig::<Tag>::for_model()
            .with_lookup_field(LookupField::Related {
                table: "post".to_string(),
                column: "tag_slug".to_string(),
            })
            .with_lookup_url_kwarg("tag");
        assert_eq!(config.lookup_field().column().to_string(), "post.tag_slug");
        assert_eq!(config.lookup_url_kwarg(), "tag");
    }

    #[test]
    fn test_from_settings_picks_pagination() {
        let settings = ApiSettings {
            default_pagination: PaginationStyle::PageNumber,
            ..ApiSettings::default()
        };
        assert!(ViewConfig::<Tag>::from_settings(&settings)
            .pagination_class()
            .is_some());
        assert!(ViewConfig::<Tag>::from_settings(&ApiSettings::default())
            .pagination_class()
            .is_none());
    }
}
