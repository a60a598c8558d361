//! HTTP surface: axum router, shared state, handlers, and error mapping.

pub mod error;
pub mod handlers;

use std::path::Path;
use std::sync::Arc;

use axum::http::{HeaderName, Method};
use axum::routing::{get, post};
use axum::Router;
use geosync_core::{CountryService, CountrySource, CountryStore};
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

pub use error::{ApiError, ApiResult};

/// Shared handles; every request builds its own [`CountryService`] from them.
#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn CountryStore>,
    source: Arc<dyn CountrySource>,
}

impl AppState {
    pub fn new(store: Arc<dyn CountryStore>, source: Arc<dyn CountrySource>) -> Self {
        Self { store, source }
    }

    pub fn service(&self) -> CountryService {
        CountryService::new(self.store.clone(), self.source.clone())
    }
}

/// Builds the API router. When `static_dir` is given, `/` serves its
/// `index.html` and `/static` serves the rest of the directory.
pub fn router(state: AppState, static_dir: Option<&Path>) -> Router {
    let request_id_header = HeaderName::from_static("x-request-id");

    let mut app: Router<AppState> = Router::new()
        .route("/health", get(handlers::healthcheck))
        .route("/api/countries/sync", post(handlers::sync_countries))
        .route("/api/countries", get(handlers::list_countries))
        .route("/api/countries/", get(handlers::list_countries))
        .route("/api/countries/regions", get(handlers::list_regions))
        .route("/api/countries/{code}", get(handlers::get_country));

    if let Some(dir) = static_dir {
        app = app
            .route_service("/", ServeFile::new(dir.join("index.html")))
            .nest_service("/static", ServeDir::new(dir));
    }

    app.layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_headers(Any)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS]),
        )
        .with_state(state)
}
