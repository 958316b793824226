//! Core module containing the query layer and request primitives views build on

pub mod error;
pub mod model;
pub mod query;
pub mod request;
pub mod session;

pub use error::{FieldValidationError, QueryError, ViewError, ViewResult};
pub use model::Model;
pub use query::{Column, Direction, Operator, Predicate, Query};
pub use request::{ApiRequest, ViewArgs};
pub use session::Session;
