//! ServerBuilder for fluent API to build HTTP servers out of views

use super::extract::ApiState;
use super::router::view_route;
use crate::config::ApiSettings;
use crate::core::session::Session;
use crate::views::generics::ApiView;
use anyhow::{Context, Result};
use axum::routing::{MethodRouter, get};
use axum::{Json, Router};
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Builder for creating HTTP servers from verb views
///
/// # Example
///
/// ```ignore
/// let app = ServerBuilder::new()
///     .with_session(InMemorySession::new())
///     .route("/users", ListCreateApiView::new(users.clone()))
///     .route("/users/{id}", RetrieveUpdateDestroyApiView::new(users))
///     .build()?;
/// ```
pub struct ServerBuilder {
    session: Option<Arc<dyn Session>>,
    settings: ApiSettings,
    routes: Vec<(String, MethodRouter<ApiState>)>,
    custom_routes: Vec<Router>,
    cors: Option<CorsLayer>,
}

impl ServerBuilder {
    pub fn new() -> Self {
        Self {
            session: None,
            settings: ApiSettings::default(),
            routes: Vec::new(),
            custom_routes: Vec::new(),
            cors: None,
        }
    }

    /// Set the database session (required)
    pub fn with_session(self, session: impl Session + 'static) -> Self {
        self.with_shared_session(Arc::new(session))
    }

    /// Set a session that is also used outside the server
    pub fn with_shared_session(mut self, session: Arc<dyn Session>) -> Self {
        self.session = Some(session);
        self
    }

    pub fn with_settings(mut self, settings: ApiSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Load settings from a YAML file
    pub fn with_settings_file(self, path: &str) -> Result<Self> {
        let settings = ApiSettings::from_yaml_file(path)
            .with_context(|| format!("Failed to load API settings from {}", path))?;
        Ok(self.with_settings(settings))
    }

    /// Mount a view under `path`
    ///
    /// Path parameters (`/users/{id}`) reach the view as keyword arguments.
    pub fn route(mut self, path: impl Into<String>, view: impl ApiView + 'static) -> Self {
        self.routes.push((path.into(), view_route(Arc::new(view))));
        self
    }

    /// Add custom routes to the server
    ///
    /// Use this for endpoints that are not generic views, such as
    /// authentication or webhooks.
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    pub fn with_cors(mut self, cors: CorsLayer) -> Self {
        self.cors = Some(cors);
        self
    }

    /// Build the final router
    ///
    /// This generates:
    /// - one route per mounted view
    /// - health check routes
    /// - the custom routes
    pub fn build(mut self) -> Result<Router> {
        let session = self
            .session
            .take()
            .ok_or_else(|| anyhow::anyhow!("Session is required. Call .with_session()"))?;
        self.settings.validate()?;

        let state = ApiState::new(session, self.settings);

        let mut views = Router::new();
        for (path, route) in self.routes {
            tracing::debug!(path = %path, "mounting view");
            views = views.route(&path, route);
        }

        let mut app = health_routes().merge(views.with_state(state));
        for custom_router in self.custom_routes {
            app = app.merge(custom_router);
        }

        let app = app.layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()));
        Ok(match self.cors {
            Some(cors) => app.layer(cors),
            None => app,
        })
    }

    /// Serve the application with graceful shutdown
    ///
    /// This will:
    /// - Bind to the provided address
    /// - Start serving requests
    /// - Handle SIGTERM and SIGINT (Ctrl+C) for graceful shutdown
    pub async fn serve(self, addr: &str) -> Result<()> {
        let app = self.build()?;
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn health_routes() -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/healthz", get(health_check))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME")
    }))
}

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
