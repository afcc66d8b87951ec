use std::sync::Arc;

use axum::{extract::State, response::Html};

use crate::state::AppState;

const INDEX_HTML: &str = include_str!("../../templates/index.html");

pub async fn index_handler(State(state): State<Arc<AppState>>) -> Html<String> {
    render_index(state.config.max_file_size_mb)
}

/// Render the single-page UI, injecting the upload size limit.
pub fn render_index(max_file_size_mb: usize) -> Html<String> {
    let html = INDEX_HTML
        .replace("{{ max_file_size_mb }}", &max_file_size_mb.to_string())
        .replace("{{ version }}", env!("CARGO_PKG_VERSION"));
    Html(html)
}
