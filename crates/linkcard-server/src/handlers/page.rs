//! Public read-only card.

use axum::extract::State;
use axum::response::Html;

use crate::render::render_page;
use crate::state::AppState;

/// Renders the published snapshot.
///
/// `GET /`
pub async fn index(State(state): State<AppState>) -> Html<String> {
    let snapshot = state.service.published().await;
    Html(render_page(&snapshot))
}
