//! # restful
//!
//! Generic REST API views for axum over a composable query layer.
//!
//! ## Features
//!
//! - **GenericApiView**: query resolution, filtering, pagination, single-object
//!   lookup and request-bound schemas for one model
//! - **Verb views**: `ListCreateApiView`, `RetrieveUpdateDestroyApiView` and
//!   friends map HTTP verbs onto lifecycle traits
//! - **Pluggable strategies**: field/search/order filters and page-number or
//!   Link-header pagination
//! - **Configuration-Based**: pagination defaults and parameter names from YAML
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use restful::prelude::*;
//!
//! #[derive(Clone, Debug, Serialize, Deserialize, Validate)]
//! struct User {
//!     id: Option<i64>,
//!     name: String,
//! }
//!
//! impl_model!(User, "user");
//!
//! #[derive(Clone)]
//! struct Users(Arc<ViewConfig<User>>);
//!
//! #[async_trait]
//! impl List for Users {
//!     async fn list(&self, request: ApiRequest, args: ViewArgs) -> ViewResult<Response> {
//!         mixins::list(&mut self.0.bind(request, &args))
//!     }
//! }
//!
//! let users = Users(Arc::new(
//!     ViewConfig::<User>::for_model()
//!         .with_schema_class(ModelSchema::class())
//!         .with_filter(FieldFilter)
//!         .with_filter_fields(["name"]),
//! ));
//!
//! ServerBuilder::new()
//!     .with_session(InMemorySession::new())
//!     .route("/users", ListApiView::new(users))
//!     .serve("127.0.0.1:3000")
//!     .await?;
//! ```

pub mod config;
pub mod core;
pub mod server;
pub mod storage;
pub mod views;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        ApiRequest, Column, Direction, FieldValidationError, Model, Operator, Predicate, Query,
        QueryError, Session, ViewArgs, ViewError, ViewResult, session::query,
    };

    // === Macros ===
    pub use crate::impl_model;

    // === Views ===
    pub use crate::views::{
        ApiView, BasePagination, Create, CreateApiView, Destroy, DestroyApiView, FieldFilter,
        FilterBackend, GenericApiView, LinkHeaderPagination, List, ListApiView,
        ListCreateApiView, LookupField, ModelSchema, OrderFilter, PageNumberPagination,
        Pagination, Retrieve, RetrieveApiView, RetrieveDestroyApiView, RetrieveUpdateApiView,
        RetrieveUpdateDestroyApiView, Schema, SchemaClass, SchemaContext, SearchFilter, Update,
        UpdateApiView, ViewConfig, mixins,
    };

    // === Storage ===
    pub use crate::storage::InMemorySession;

    // === Config ===
    pub use crate::config::{ApiSettings, PaginationStyle};

    // === Server ===
    pub use crate::server::{ApiState, ServerBuilder, view_route};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use serde::{Deserialize, Serialize};
    pub use std::sync::Arc;
    pub use validator::Validate;

    // === Axum ===
    pub use axum::{
        Json, Router,
        http::{Method, StatusCode},
        response::{IntoResponse, Response},
    };
}
