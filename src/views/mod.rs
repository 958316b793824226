//! Generic views: configuration, filtering, pagination, schemas and the
//! concrete verb views built from them

pub mod config;
pub mod filters;
pub mod generic;
pub mod generics;
pub mod mixins;
pub mod pagination;
pub mod schema;

pub use config::{LookupField, PaginationClass, QueryResolver, SchemaClassResolver, ViewConfig};
pub use filters::{FieldFilter, FilterBackend, OrderFilter, SearchFilter};
pub use generic::GenericApiView;
pub use generics::{
    ApiView, Create, CreateApiView, Destroy, DestroyApiView, List, ListApiView, ListCreateApiView,
    Retrieve, RetrieveApiView, RetrieveDestroyApiView, RetrieveUpdateApiView,
    RetrieveUpdateDestroyApiView, Update, UpdateApiView,
};
pub use pagination::{BasePagination, LinkHeaderPagination, PageNumberPagination, Pagination};
pub use schema::{ModelSchema, Schema, SchemaClass, SchemaContext};
