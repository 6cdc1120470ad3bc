//! Workbench Backend
//!
//! Workspace engine for a browser IDE: per-user projects with a single-rooted file
//! tree in SQLite, a bounded recent-files list, starter templates, reachability
//! cleanup, Tantivy file search, and the client-side session pieces (tabs, open-file
//! channel, terminal) that sit on top of it.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod models;
pub mod search;
pub mod session;
pub mod templates;
pub mod terminal;
pub mod tree;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use db::Repository;
use search::SearchIndex;
use session::ActiveProjectPointer;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub search: Arc<SearchIndex>,
    pub active: Arc<ActiveProjectPointer>,
    pub config: Arc<Config>,
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Clone PSK for the auth layer
    let psk = state.config.api_psk.clone();

    // API routes
    let api_routes = Router::new()
        .route("/revision", get(api::get_revision))
        // Projects
        .route(
            "/projects",
            get(api::list_projects).post(api::create_project),
        )
        .route(
            "/projects/active",
            get(api::get_active_project).put(api::select_project),
        )
        .route(
            "/projects/{id}",
            get(api::get_project).delete(api::delete_project),
        )
        // Project workspace
        .route(
            "/projects/{id}/files",
            get(api::list_files).post(api::create_file),
        )
        .route("/projects/{id}/template", post(api::apply_template))
        .route("/projects/{id}/clean", post(api::clean_project))
        .route("/projects/{id}/reset", post(api::reset_project))
        .route("/projects/{id}/terminal", post(api::run_terminal))
        .route("/projects/{id}/search", get(api::search_files))
        // Files
        .route(
            "/files/{id}",
            get(api::get_file)
                .put(api::update_file)
                .delete(api::delete_file),
        )
        .route("/recent", get(api::list_recent))
        // Apply PSK auth middleware
        .layer(middleware::from_fn(move |req, next| {
            auth::psk_auth_layer(psk.clone(), req, next)
        }));

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
