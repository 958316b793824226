//! Concrete verb views
//!
//! Each view binds a fixed set of HTTP verbs to lifecycle methods of the
//! wrapped implementation and passes the request and route arguments through
//! untouched. The lifecycle traits have no default bodies: an implementation
//! writes them itself, often on top of [`mixins`](crate::views::mixins).
//!
//! ```rust,ignore
//! struct Users { config: Arc<ViewConfig<User>> }
//!
//! #[async_trait]
//! impl List for Users {
//!     async fn list(&self, request: ApiRequest, args: ViewArgs) -> ViewResult<Response> {
//!         mixins::list(&mut self.config.bind(request, &args))
//!     }
//! }
//!
//! let view = ListApiView::new(Users { config });
//! ```

use crate::core::error::{ViewError, ViewResult};
use crate::core::request::{ApiRequest, ViewArgs};
use async_trait::async_trait;
use axum::http::Method;
use axum::response::Response;

/// Create a new object
#[async_trait]
pub trait Create: Send + Sync {
    async fn create(&self, request: ApiRequest, args: ViewArgs) -> ViewResult<Response>;
}

/// List a collection
#[async_trait]
pub trait List: Send + Sync {
    async fn list(&self, request: ApiRequest, args: ViewArgs) -> ViewResult<Response>;
}

/// Show a single object
#[async_trait]
pub trait Retrieve: Send + Sync {
    async fn retrieve(&self, request: ApiRequest, args: ViewArgs) -> ViewResult<Response>;
}

/// Replace or partially change a single object
#[async_trait]
pub trait Update: Send + Sync {
    async fn update(&self, request: ApiRequest, args: ViewArgs) -> ViewResult<Response>;

    async fn partial_update(&self, request: ApiRequest, args: ViewArgs) -> ViewResult<Response>;
}

/// Delete a single object
#[async_trait]
pub trait Destroy: Send + Sync {
    async fn destroy(&self, request: ApiRequest, args: ViewArgs) -> ViewResult<Response>;
}

/// A view the router can mount
#[async_trait]
pub trait ApiView: Send + Sync {
    /// Verbs this view answers
    fn allowed_methods(&self) -> Vec<Method>;

    /// Route a request to the handler bound to `method`
    ///
    /// Verbs the view does not bind fail with [`ViewError::MethodNotAllowed`].
    async fn dispatch(
        &self,
        method: &Method,
        request: ApiRequest,
        args: ViewArgs,
    ) -> ViewResult<Response>;
}

/// Declare a verb view over a set of lifecycle traits
///
/// ```rust,ignore
/// generic_view! {
///     /// docs
///     ListCreateApiView: List + Create {
///         get(GET) => list,
///         post(POST) => create,
///     }
/// }
/// ```
macro_rules! generic_view {
    (
        $(#[$meta:meta])*
        $name:ident: $first:ident $(+ $bound:ident)* {
            $($verb:ident($http:ident) => $lifecycle:ident),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default)]
        pub struct $name<V> {
            view: V,
        }

        impl<V> $name<V> {
            pub fn new(view: V) -> Self {
                Self { view }
            }

            /// The wrapped lifecycle implementation
            pub fn inner(&self) -> &V {
                &self.view
            }
        }

        impl<V> $name<V>
        where
            V: $first $(+ $bound)* + 'static,
        {
            $(
                pub async fn $verb(&self, request: ApiRequest, args: ViewArgs) -> ViewResult<Response> {
                    self.view.$lifecycle(request, args).await
                }
            )+
        }

        #[async_trait]
        impl<V> ApiView for $name<V>
        where
            V: $first $(+ $bound)* + 'static,
        {
            fn allowed_methods(&self) -> Vec<Method> {
                vec![$(Method::$http),+]
            }

            async fn dispatch(
                &self,
                method: &Method,
                request: ApiRequest,
                args: ViewArgs,
            ) -> ViewResult<Response> {
                tracing::debug!(view = stringify!($name), method = %method, "dispatch");
                $(
                    if *method == Method::$http {
                        return self.$verb(request, args).await;
                    }
                )+
                Err(ViewError::MethodNotAllowed {
                    method: method.to_string(),
                })
            }
        }
    };
}

generic_view! {
    /// POST creates an object
    CreateApiView: Create {
        post(POST) => create,
    }
}

generic_view! {
    /// GET lists a collection
    ListApiView: List {
        get(GET) => list,
    }
}

generic_view! {
    /// GET shows one object
    RetrieveApiView: Retrieve {
        get(GET) => retrieve,
    }
}

generic_view! {
    /// PUT replaces, PATCH partially changes one object
    UpdateApiView: Update {
        put(PUT) => update,
        patch(PATCH) => partial_update,
    }
}

generic_view! {
    /// DELETE removes one object
    DestroyApiView: Destroy {
        delete(DELETE) => destroy,
    }
}

generic_view! {
    /// GET lists, POST creates
    ListCreateApiView: List + Create {
        get(GET) => list,
        post(POST) => create,
    }
}

generic_view! {
    RetrieveUpdateApiView: Retrieve + Update {
        get(GET) => retrieve,
        put(PUT) => update,
        patch(PATCH) => partial_update,
    }
}

generic_view! {
    RetrieveDestroyApiView: Retrieve + Destroy {
        get(GET) => retrieve,
        delete(DELETE) => destroy,
    }
}

generic_view! {
    /// Full detail endpoint: GET, PUT, PATCH and DELETE
    RetrieveUpdateDestroyApiView: Retrieve + Update + Destroy {
        get(GET) => retrieve,
        put(PUT) => update,
        patch(PATCH) => partial_update,
        delete(DELETE) => destroy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemorySession;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use std::sync::{Arc, Mutex};

    /// Records every lifecycle call it receives
    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<(&'static str, ApiRequest, ViewArgs)>>,
    }

    impl Recorder {
        fn record(&self, name: &'static str, request: ApiRequest, args: ViewArgs) -> ViewResult<Response> {
            self.calls.lock().unwrap().push((name, request, args));
            Ok(StatusCode::NO_CONTENT.into_response())
        }

        fn calls(&self) -> Vec<(&'static str, ApiRequest, ViewArgs)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Create for Recorder {
        async fn create(&self, request: ApiRequest, args: ViewArgs) -> ViewResult<Response> {
            self.record("create", request, args)
        }
    }

    #[async_trait]
    impl List for Recorder {
        async fn list(&self, request: ApiRequest, args: ViewArgs) -> ViewResult<Response> {
            self.record("list", request, args)
        }
    }

    #[async_trait]
    impl Retrieve for Recorder {
        async fn retrieve(&self, request: ApiRequest, args: ViewArgs) -> ViewResult<Response> {
            self.record("retrieve", request, args)
        }
    }

    #[async_trait]
    impl Update for Recorder {
        async fn update(&self, request: ApiRequest, args: ViewArgs) -> ViewResult<Response> {
            self.record("update", request, args)
        }

        async fn partial_update(&self, request: ApiRequest, args: ViewArgs) -> ViewResult<Response> {
            self.record("partial_update", request, args)
        }
    }

    #[async_trait]
    impl Destroy for Recorder {
        async fn destroy(&self, request: ApiRequest, args: ViewArgs) -> ViewResult<Response> {
            self.record("destroy", request, args)
        }
    }

    fn request() -> ApiRequest {
        ApiRequest::new(Arc::new(InMemorySession::new()))
    }

    fn args() -> ViewArgs {
        ViewArgs::new().arg("a").kwarg("id", "1")
    }

    fn assert_single_call(recorder: &Recorder, name: &str, request: &ApiRequest) {
        let calls = recorder.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, name);
        assert_eq!(&calls[0].1, request);
        assert_eq!(calls[0].2, args());
    }

    #[tokio::test]
    async fn test_create_api_view() {
        let view = CreateApiView::new(Recorder::default());
        let request = request();
        view.post(request.clone(), args()).await.unwrap();
        assert_single_call(view.inner(), "create", &request);
    }

    #[tokio::test]
    async fn test_list_api_view() {
        let view = ListApiView::new(Recorder::default());
        let request = request();
        view.get(request.clone(), args()).await.unwrap();
        assert_single_call(view.inner(), "list", &request);
    }

    #[tokio::test]
    async fn test_retrieve_api_view() {
        let view = RetrieveApiView::new(Recorder::default());
        let request = request();
        view.get(request.clone(), args()).await.unwrap();
        assert_single_call(view.inner(), "retrieve", &request);
    }

    #[tokio::test]
    async fn test_update_api_view_put() {
        let view = UpdateApiView::new(Recorder::default());
        let request = request();
        view.put(request.clone(), args()).await.unwrap();
        assert_single_call(view.inner(), "update", &request);
    }

    #[tokio::test]
    async fn test_update_api_view_patch() {
        let view = UpdateApiView::new(Recorder::default());
        let request = request();
        view.patch(request.clone(), args()).await.unwrap();
        assert_single_call(view.inner(), "partial_update", &request);
    }

    #[tokio::test]
    async fn test_destroy_api_view() {
        let view = DestroyApiView::new(Recorder::default());
        let request = request();
        view.delete(request.clone(), args()).await.unwrap();
        assert_single_call(view.inner(), "destroy", &request);
    }

    #[tokio::test]
    async fn test_list_create_api_view() {
        let view = ListCreateApiView::new(Recorder::default());
        let request = request();
        view.get(request.clone(), args()).await.unwrap();
        assert_single_call(view.inner(), "list", &request);

        let view = ListCreateApiView::new(Recorder::default());
        view.post(request.clone(), args()).await.unwrap();
        assert_single_call(view.inner(), "create", &request);
    }

    #[tokio::test]
    async fn test_retrieve_update_api_view() {
        let request = request();
        for (method, expected) in [
            (Method::GET, "retrieve"),
            (Method::PUT, "update"),
            (Method::PATCH, "partial_update"),
        ] {
            let view = RetrieveUpdateApiView::new(Recorder::default());
            view.dispatch(&method, request.clone(), args()).await.unwrap();
            assert_single_call(view.inner(), expected, &request);
        }
    }

    #[tokio::test]
    async fn test_retrieve_destroy_api_view() {
        let request = request();
        for (method, expected) in [(Method::GET, "retrieve"), (Method::DELETE, "destroy")] {
            let view = RetrieveDestroyApiView::new(Recorder::default());
            view.dispatch(&method, request.clone(), args()).await.unwrap();
            assert_single_call(view.inner(), expected, &request);
        }
    }

    #[tokio::test]
    async fn test_retrieve_update_destroy_api_view() {
        let request = request();
        for (method, expected) in [
            (Method::GET, "retrieve"),
            (Method::PUT, "update"),
            (Method::PATCH, "partial_update"),
            (Method::DELETE, "destroy"),
        ] {
            let view = RetrieveUpdateDestroyApiView::new(Recorder::default());
            view.dispatch(&method, request.clone(), args()).await.unwrap();
            assert_single_call(view.inner(), expected, &request);
        }
    }

    #[test]
    fn test_unbound_verb_is_not_allowed() {
        let view = ListApiView::new(Recorder::default());
        let err = tokio_test::block_on(view.dispatch(&Method::DELETE, request(), args()))
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::METHOD_NOT_ALLOWED);
        assert!(view.inner().calls().is_empty());
    }

    #[test]
    fn test_allowed_methods() {
        let view = RetrieveUpdateDestroyApiView::new(Recorder::default());
        assert_eq!(
            view.allowed_methods(),
            vec![Method::GET, Method::PUT, Method::PATCH, Method::DELETE]
        );
        assert_eq!(
            ListCreateApiView::new(Recorder::default()).allowed_methods(),
            vec![Method::GET, Method::POST]
        );
    }
}
