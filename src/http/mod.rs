// HTTP surface - REST API under /api plus the prebuilt frontend
//
// Anything the API does not route is answered by the frontend: a static file
// for GET/HEAD when one matches, otherwise the entry document (index.html) so
// client-side routing works on reload. That includes known API paths called
// with a method they do not handle.

pub mod error;
pub mod handlers;
pub mod payload;

use crate::config::ServerConfig;
use crate::repository::Repository;
use axum::{
    extract::{DefaultBodyLimit, Request},
    http::Method,
    response::{IntoResponse, Response},
    routing::{get, put},
    Router,
};
use std::sync::Arc;
use tower::{ServiceBuilder, ServiceExt};
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
}

// ============================================================================
// FRONTEND
// ============================================================================

#[derive(Clone)]
pub struct Frontend {
    assets: ServeDir<ServeFile>,
    entry: ServeFile,
}

impl Frontend {
    pub fn new(config: &ServerConfig) -> Self {
        let entry = ServeFile::new(config.index_file());
        Frontend {
            assets: ServeDir::new(&config.static_root).fallback(entry.clone()),
            entry,
        }
    }

    /// Static assets answer GET/HEAD only; every other method gets the entry
    /// document, served as if requested with GET. 404 when the file is missing.
    pub async fn serve(self, mut req: Request) -> Response {
        if req.method() == Method::GET || req.method() == Method::HEAD {
            match self.assets.oneshot(req).await {
                Ok(response) => response.into_response(),
                Err(never) => match never {},
            }
        } else {
            *req.method_mut() = Method::GET;
            match self.entry.oneshot(req).await {
                Ok(response) => response.into_response(),
                Err(never) => match never {},
            }
        }
    }
}

// ============================================================================
// ROUTES
// ============================================================================

pub fn api_routes(repo: Arc<Repository>, frontend: Frontend) -> Router {
    let spa = move |req: Request| frontend.clone().serve(req);

    Router::new()
        .route("/health", get(handlers::health).fallback(spa.clone()))
        .route(
            "/members",
            get(handlers::list_members)
                .post(handlers::create_member)
                .fallback(spa.clone()),
        )
        .route(
            "/members/:id",
            get(handlers::get_member)
                .put(handlers::update_member)
                .delete(handlers::delete_member)
                .fallback(spa.clone()),
        )
        .route(
            "/dashboard-stats",
            get(handlers::dashboard_stats).fallback(spa.clone()),
        )
        .route(
            "/classes",
            get(handlers::list_classes)
                .post(handlers::create_class)
                .fallback(spa.clone()),
        )
        .route(
            "/staff",
            get(handlers::list_staff)
                .post(handlers::create_staff)
                .fallback(spa.clone()),
        )
        .route(
            "/invoices",
            get(handlers::list_invoices)
                .post(handlers::create_invoice)
                .fallback(spa.clone()),
        )
        .route(
            "/invoices/:id",
            put(handlers::update_invoice).fallback(spa),
        )
        .with_state(AppState { repo })
}

pub fn router(repo: Arc<Repository>, config: &ServerConfig) -> Router {
    let frontend = Frontend::new(config);
    let spa = {
        let frontend = frontend.clone();
        move |req: Request| frontend.clone().serve(req)
    };

    // Outermost first: access log, CORS, body limit
    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(DefaultBodyLimit::max(config.body_limit));

    Router::new()
        .nest("/api", api_routes(repo, frontend))
        .fallback(spa)
        .layer(middleware)
}
