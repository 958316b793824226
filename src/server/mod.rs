//! Server module for serving generic views over HTTP
//!
//! This module provides:
//! - `ApiRequest` extraction from axum requests
//! - `view_route` to mount a verb view under a path
//! - a `ServerBuilder` wiring views, health checks and tracing together

pub mod builder;
pub mod extract;
pub mod router;

pub use builder::ServerBuilder;
pub use extract::ApiState;
pub use router::view_route;
