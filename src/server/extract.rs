//! Axum extraction of [`ApiRequest`]

use crate::config::ApiSettings;
use crate::core::error::ViewError;
use crate::core::request::ApiRequest;
use crate::core::session::Session;
use axum::body::Bytes;
use axum::extract::{FromRef, FromRequest, Request};
use serde_json::Value;
use std::sync::Arc;

/// Shared state every view route needs
#[derive(Clone)]
pub struct ApiState {
    pub session: Arc<dyn Session>,
    pub settings: Arc<ApiSettings>,
}

impl ApiState {
    pub fn new(session: Arc<dyn Session>, settings: ApiSettings) -> Self {
        Self {
            session,
            settings: Arc::new(settings),
        }
    }
}

/// Build an [`ApiRequest`] from the HTTP request
///
/// The query string is decoded into parameters and a non-empty body must be
/// JSON; a malformed body is rejected with 400 before any view runs.
impl<S> FromRequest<S> for ApiRequest
where
    ApiState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ViewError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let ApiState { session, settings } = ApiState::from_ref(state);
        let method = req.method().clone();
        let uri = req.uri().clone();

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| ViewError::bad_request(format!("Failed to read request body: {}", e)))?;

        let mut request = ApiRequest::new(session)
            .with_settings(settings)
            .with_method(method)
            .with_uri(uri);

        if !bytes.is_empty() {
            let body: Value = serde_json::from_slice(&bytes)
                .map_err(|e| ViewError::bad_request(format!("Invalid JSON: {}", e)))?;
            request = request.with_body(body);
        }

        tracing::debug!(
            request_id = %request.id(),
            method = %request.method(),
            uri = %request.uri(),
            "extracted api request"
        );

        Ok(request)
    }
}
