//! Request-scoped data handed to views

use crate::config::ApiSettings;
use crate::core::session::Session;
use axum::extract::Query as QueryString;
use axum::http::{Method, Uri};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// An incoming API request as views see it
///
/// Carries the decoded query-string parameters (in the order the client sent
/// them), the JSON body if there was one, and the database session attached
/// for this request. Cheap to clone; clones compare equal.
#[derive(Clone)]
pub struct ApiRequest {
    id: Uuid,
    method: Method,
    uri: Uri,
    params: IndexMap<String, String>,
    body: Option<Value>,
    dbsession: Arc<dyn Session>,
    settings: Arc<ApiSettings>,
    received_at: DateTime<Utc>,
}

impl ApiRequest {
    /// A `GET /` request with no parameters on the given session
    pub fn new(dbsession: Arc<dyn Session>) -> Self {
        Self {
            id: Uuid::new_v4(),
            method: Method::GET,
            uri: Uri::from_static("/"),
            params: IndexMap::new(),
            body: None,
            dbsession,
            settings: Arc::new(ApiSettings::default()),
            received_at: Utc::now(),
        }
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Set the URI, replacing the parameters with its decoded query string
    pub fn with_uri(mut self, uri: Uri) -> Self {
        self.params = QueryString::<Vec<(String, String)>>::try_from_uri(&uri)
            .map(|QueryString(pairs)| pairs.into_iter().collect())
            .unwrap_or_default();
        self.uri = uri;
        self
    }

    /// Add query parameters without touching the URI
    pub fn with_params<K, V>(mut self, params: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.params
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_settings(mut self, settings: Arc<ApiSettings>) -> Self {
        self.settings = settings;
        self
    }

    /// Unique id of this request
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Query-string parameters
    pub fn params(&self) -> &IndexMap<String, String> {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// The database session attached to this request
    pub fn dbsession(&self) -> &Arc<dyn Session> {
        &self.dbsession
    }

    pub fn settings(&self) -> &ApiSettings {
        &self.settings
    }

    pub fn received_at(&self) -> DateTime<Utc> {
        self.received_at
    }
}

impl PartialEq for ApiRequest {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl fmt::Debug for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiRequest")
            .field("id", &self.id)
            .field("method", &self.method)
            .field("uri", &self.uri)
            .field("params", &self.params)
            .field("body", &self.body)
            .finish()
    }
}

/// Positional and keyword arguments a route hands to a view
///
/// Keyword arguments hold the URL path parameters (`/users/{id}` gives
/// `id`), which detail views use as lookup values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewArgs {
    pub args: Vec<String>,
    pub kwargs: IndexMap<String, String>,
}

impl ViewArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arg(mut self, value: impl Into<String>) -> Self {
        self.args.push(value.into());
        self
    }

    pub fn kwarg(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.kwargs.insert(key.into(), value.into());
        self
    }
}
