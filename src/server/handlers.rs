use super::error::ApiError;
use super::AppState;
use crate::components::editor::{
    CategoryChip, DeleteOutcome, ImportSummary, SaveOutcome, SessionSummary, TimelineView,
    WidgetEvent, WidgetEventReport,
};
use crate::error::Error;
use crate::model::{Draft, DraftPatch, Event, EventId};
use axum::body::Bytes;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Debug, Deserialize)]
pub struct RawImportParams {
    pub file_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DateClickRequest {
    pub date: String,
}

#[derive(Debug, Deserialize)]
pub struct DateSelectRequest {
    pub start: String,
    /// Exclusive end as the widget reports it
    pub end: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteRequest {
    #[serde(default)]
    pub confirmed: bool,
}

/// Handler for API health check
pub async fn health_handler() -> &'static str {
    "OK"
}

pub async fn summary_handler(State(state): State<AppState>) -> ApiResult<SessionSummary> {
    Ok(Json(state.editor.summary().await?))
}

pub async fn document_handler(State(state): State<AppState>) -> ApiResult<Value> {
    Ok(Json(state.editor.document_json().await?))
}

fn decode_upload(data: &[u8]) -> Result<String, Error> {
    String::from_utf8(data.to_vec())
        .map_err(|e| Error::InvalidJson(format!("file is not valid UTF-8: {}", e)))
}

/// Import a document uploaded as multipart field `file`
pub async fn import_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<ImportSummary> {
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(e.body_text()))?
    {
        if field.name() == Some("file") {
            let file_name = field.file_name().map(str::to_string);
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::bad_request(e.body_text()))?;
            upload = Some((file_name, data));
        }
    }

    let Some((file_name, data)) = upload else {
        warn!("Import request without a file field");
        return Err(ApiError::bad_request("missing multipart field 'file'"));
    };

    info!("Received upload {:?} ({} bytes)", file_name, data.len());
    let contents = decode_upload(&data)?;
    Ok(Json(state.editor.import(file_name, contents).await?))
}

/// Import the raw request body
pub async fn import_raw_handler(
    State(state): State<AppState>,
    Query(params): Query<RawImportParams>,
    body: Bytes,
) -> ApiResult<ImportSummary> {
    let contents = decode_upload(&body)?;
    Ok(Json(state.editor.import(params.file_name, contents).await?))
}

/// `Content-Disposition` value with an ASCII fallback and the UTF-8 name
fn attachment_header(file_name: &str) -> String {
    let fallback: String = file_name
        .chars()
        .map(|c| {
            if c.is_ascii_graphic() && c != '"' && c != '\\' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(file_name)
    )
}

/// Download the document as a JSON file
pub async fn export_handler(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let file = state.editor.export().await?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/json; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, attachment_header(&file.file_name)),
        ],
        file.contents,
    ))
}

pub async fn categories_handler(State(state): State<AppState>) -> ApiResult<Vec<CategoryChip>> {
    Ok(Json(state.editor.category_chips().await?))
}

pub async fn calendar_events_handler(
    State(state): State<AppState>,
) -> ApiResult<Arc<Vec<WidgetEvent>>> {
    Ok(Json(state.editor.widget_events().await?))
}

pub async fn event_click_handler(
    State(state): State<AppState>,
    Json(report): Json<WidgetEventReport>,
) -> ApiResult<Draft> {
    Ok(Json(state.editor.event_click(report).await?))
}

pub async fn date_click_handler(
    State(state): State<AppState>,
    Json(request): Json<DateClickRequest>,
) -> ApiResult<Draft> {
    Ok(Json(state.editor.date_click(request.date).await?))
}

pub async fn date_select_handler(
    State(state): State<AppState>,
    Json(request): Json<DateSelectRequest>,
) -> ApiResult<Draft> {
    Ok(Json(
        state.editor.date_select(request.start, request.end).await?,
    ))
}

pub async fn event_drop_handler(
    State(state): State<AppState>,
    Json(report): Json<WidgetEventReport>,
) -> ApiResult<Event> {
    Ok(Json(state.editor.event_drop(report).await?))
}

pub async fn timeline_handler(State(state): State<AppState>) -> ApiResult<TimelineView> {
    Ok(Json(state.editor.timeline().await?))
}

pub async fn timeline_select_handler(
    State(state): State<AppState>,
    Path(id): Path<EventId>,
) -> ApiResult<Draft> {
    Ok(Json(state.editor.timeline_click(id).await?))
}

pub async fn get_draft_handler(State(state): State<AppState>) -> ApiResult<Draft> {
    Ok(Json(state.editor.draft().await?))
}

pub async fn patch_draft_handler(
    State(state): State<AppState>,
    Json(patch): Json<DraftPatch>,
) -> ApiResult<Draft> {
    Ok(Json(state.editor.patch_draft(patch).await?))
}

pub async fn clear_draft_handler(State(state): State<AppState>) -> ApiResult<Draft> {
    Ok(Json(state.editor.clear_draft().await?))
}

pub async fn save_draft_handler(State(state): State<AppState>) -> ApiResult<SaveOutcome> {
    Ok(Json(state.editor.save().await?))
}

pub async fn delete_draft_handler(
    State(state): State<AppState>,
    Json(request): Json<DeleteRequest>,
) -> ApiResult<DeleteOutcome> {
    Ok(Json(state.editor.delete_selected(request.confirmed).await?))
}
