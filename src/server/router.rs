//! Mounting verb views on axum routes

use super::extract::ApiState;
use crate::core::error::ViewError;
use crate::core::request::{ApiRequest, ViewArgs};
use crate::views::generics::ApiView;
use axum::extract::{FromRef, Path};
use axum::http::{HeaderValue, Method, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{MethodRouter, any};
use std::sync::Arc;

/// Route every verb on a path to `view`
///
/// Path parameters become the view's keyword arguments, so
/// `/users/{id}` hands `id` to `get_object()`. Verbs the view does not bind
/// answer 405 with an `Allow` header.
///
/// # Example
///
/// ```rust,ignore
/// let app = Router::new()
///     .route("/users", view_route(Arc::new(ListCreateApiView::new(users))))
///     .route("/users/{id}", view_route(Arc::new(RetrieveUpdateDestroyApiView::new(users))))
///     .with_state(state);
/// ```
pub fn view_route<V, S>(view: Arc<V>) -> MethodRouter<S>
where
    V: ApiView + 'static,
    S: Clone + Send + Sync + 'static,
    ApiState: FromRef<S>,
{
    any(
        move |params: Option<Path<Vec<(String, String)>>>, request: ApiRequest| {
            let view = view.clone();
            async move {
                let method = request.method().clone();
                let args = ViewArgs {
                    args: Vec::new(),
                    kwargs: params
                        .map(|Path(params)| params.into_iter().collect())
                        .unwrap_or_default(),
                };

                match view.dispatch(&method, request, args).await {
                    Ok(response) => response,
                    Err(err @ ViewError::MethodNotAllowed { .. }) => {
                        method_not_allowed(err, &view.allowed_methods())
                    }
                    Err(err) => err.into_response(),
                }
            }
        },
    )
}

fn method_not_allowed(err: ViewError, allowed: &[Method]) -> Response {
    let allow = allowed
        .iter()
        .map(Method::as_str)
        .collect::<Vec<_>>()
        .join(", ");

    let mut response = err.into_response();
    if let Ok(value) = HeaderValue::from_str(&allow) {
        response.headers_mut().insert(header::ALLOW, value);
    }
    response
}
