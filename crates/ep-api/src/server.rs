//! HTTP server
//!
//! Owns the shared playground state and starts the axum server.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::http::HeaderValue;
use tokio::sync::Mutex;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use ep_core::{AutosaveScheduler, Config, LiveSession, OriginFilter, PreviewRegistry, SessionStore};

use crate::error::{ApiError, Result};
use crate::routes::routes;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: SessionStore,
    pub live: Arc<Mutex<LiveSession>>,
    pub previews: Arc<PreviewRegistry>,
    pub origin_filter: Arc<OriginFilter>,
    /// `None` when autosave is disabled
    pub autosave: Option<Arc<AutosaveScheduler>>,
}

impl AppState {
    /// Build the state from configuration. The most recently updated stored
    /// session becomes the live session; a fresh one is started only when the
    /// store is empty.
    pub fn new(config: Config) -> Result<Self> {
        let origin_filter = OriginFilter::from_editor_url(&config.editor.url)?;
        let store = SessionStore::new(&config.storage.sessions_dir);
        let autosave = config
            .autosave
            .enabled
            .then(|| Arc::new(AutosaveScheduler::new(store.clone(), config.autosave.delay())));
        let live = match store.list().into_iter().next() {
            Some(record) => {
                info!("Resuming session {} ({} messages)", record.id, record.message_count());
                LiveSession::resume(record)
            }
            None => LiveSession::new(config.editor.url.clone()),
        };

        Ok(Self {
            config: Arc::new(config),
            store,
            live: Arc::new(Mutex::new(live)),
            previews: Arc::new(PreviewRegistry::new()),
            origin_filter: Arc::new(origin_filter),
            autosave,
        })
    }

    /// Queue a deferred save of the live session's current state
    pub fn schedule_save(&self, live: &LiveSession) {
        match &self.autosave {
            Some(autosave) => autosave.schedule(live.snapshot()),
            None => debug!("Autosave disabled; session {} not scheduled", live.id()),
        }
    }

    /// Write any pending saves now
    pub async fn flush(&self) -> usize {
        match &self.autosave {
            Some(autosave) => autosave.flush().await,
            None => 0,
        }
    }
}

/// Build the CORS layer from the configured origins
fn cors_layer(allowed_origins: Option<&[String]>) -> CorsLayer {
    match allowed_origins {
        Some(origins) => {
            let origins: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|origin| match origin.parse() {
                    Ok(value) => Some(value),
                    Err(_) => {
                        warn!("Ignoring invalid CORS origin {:?}", origin);
                        None
                    }
                })
                .collect();
            CorsLayer::new().allow_origin(origins).allow_methods(Any).allow_headers(Any)
        }
        None => CorsLayer::permissive(),
    }
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(state.config.server.allowed_origins.as_deref());

    Router::new()
        .merge(routes())
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(cors))
        .with_state(state)
}

/// Playground HTTP server
pub struct PlaygroundServer {
    state: AppState,
}

impl PlaygroundServer {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Get the router
    pub fn router(&self) -> Router {
        create_router(self.state.clone())
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        self.state
            .config
            .bind_address()
            .parse()
            .map_err(|e| ApiError::Server(format!("Invalid address: {}", e)))
    }

    /// Start the server
    pub async fn run(self) -> Result<()> {
        let addr = self.socket_addr()?;
        let app = self.router();

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ApiError::Server(format!("Failed to bind {}: {}", addr, e)))?;
        info!("Editor playground listening on http://{}", addr);

        axum::serve(listener, app)
            .await
            .map_err(|e| ApiError::Server(format!("Server error: {}", e)))?;

        Ok(())
    }
}

/// Start the HTTP server with the given configuration
pub async fn start_server(config: Config) -> Result<()> {
    PlaygroundServer::new(AppState::new(config)?).run().await
}
