pub mod error;
pub mod handlers;

use crate::components::EditorHandle;
use crate::config::Config;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use handlers::*;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

pub use error::ApiError;

#[derive(Clone)]
pub struct AppState {
    /// Editor actor holding the open document
    pub editor: EditorHandle,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(editor: EditorHandle, config: Config) -> Self {
        Self {
            editor,
            config: Arc::new(config),
        }
    }
}

/// Build the router with all editor endpoints
pub fn build_router(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.config.static_dir);
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health_handler))
        // Document
        .route("/api/summary", get(summary_handler))
        .route("/api/document", get(document_handler))
        .route("/api/import", post(import_handler))
        .route("/api/import/raw", post(import_raw_handler))
        .route("/api/export", get(export_handler))
        .route("/api/categories", get(categories_handler))
        // Calendar widget
        .route("/api/calendar/events", get(calendar_events_handler))
        .route("/api/calendar/event-click", post(event_click_handler))
        .route("/api/calendar/date-click", post(date_click_handler))
        .route("/api/calendar/select", post(date_select_handler))
        .route("/api/calendar/event-drop", post(event_drop_handler))
        // Timeline
        .route("/api/timeline", get(timeline_handler))
        .route("/api/timeline/{id}/select", post(timeline_select_handler))
        // Form
        .route(
            "/api/draft",
            get(get_draft_handler)
                .patch(patch_draft_handler)
                .delete(clear_draft_handler),
        )
        .route("/api/draft/save", post(save_draft_handler))
        .route("/api/draft/delete", post(delete_draft_handler))
        // Front-end
        .fallback_service(static_files)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
