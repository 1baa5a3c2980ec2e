//! Router assembly for the linkcard HTTP API.
//!
//! [`build_router`] wires all handler functions to their routes with
//! CORS and tracing middleware layers.

use axum::routing::{get, patch, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Builds the complete axum router.
///
/// Routes use axum 0.8 `/{param}` path syntax.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Public card
        .route("/", get(handlers::page::index))
        // Data endpoints
        .route("/api/get-data", get(handlers::data::get_data))
        .route(
            "/api/save-data",
            post(handlers::data::save_data).fallback(handlers::data::method_not_allowed),
        )
        // Editor sessions
        .route("/admin/login", post(handlers::admin::login))
        .route("/admin/logout", post(handlers::admin::logout))
        .route("/admin/snapshot", get(handlers::admin::get_snapshot))
        .route("/admin/save", post(handlers::admin::save))
        // Edits
        .route("/admin/edits", post(handlers::admin::apply_edit))
        .route("/admin/title", put(handlers::admin::update_title))
        .route("/admin/profile", patch(handlers::admin::update_profile))
        .route("/admin/profile/icon", post(handlers::admin::upload_icon))
        .route("/admin/links", post(handlers::admin::add_link))
        .route(
            "/admin/links/{index}",
            put(handlers::admin::update_link).delete(handlers::admin::delete_link),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
