use super::actor::{EditorActor, EditorActorHandle};
use super::projection::{CategoryChip, TimelineView, WidgetEvent};
use super::session::{
    DeleteOutcome, ExportedFile, ImportSummary, SaveOutcome, SessionSettings, SessionSummary,
    WidgetEventReport,
};
use crate::error::CalendarResult;
use crate::model::{Draft, DraftPatch, Event, EventId};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

/// Handle for interacting with the editor actor.
///
/// The actor owns the session and applies requests one at a time in
/// arrival order.
#[derive(Clone)]
pub struct EditorHandle {
    actor_handle: EditorActorHandle,
    _actor_task: Arc<JoinHandle<()>>,
}

impl EditorHandle {
    /// Create a new EditorHandle and spawn the actor
    pub fn new(settings: SessionSettings) -> Self {
        let (mut actor, handle) = EditorActor::new(settings);

        let actor_task = tokio::spawn(async move {
            actor.run().await;
        });

        Self {
            actor_handle: handle,
            _actor_task: Arc::new(actor_task),
        }
    }

    /// Replace the document with uploaded file contents
    pub async fn import(
        &self,
        file_name: Option<String>,
        contents: impl Into<String>,
    ) -> CalendarResult<ImportSummary> {
        self.actor_handle.import(file_name, contents.into()).await
    }

    /// Read a document from disk and import it under its file name
    pub async fn import_path(&self, path: impl AsRef<Path>) -> CalendarResult<ImportSummary> {
        let path = path.as_ref();
        info!("Loading calendar document from {}", path.display());

        let contents = tokio::fs::read_to_string(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned());

        self.import(file_name, contents).await
    }

    /// Serialized document and its download name
    pub async fn export(&self) -> CalendarResult<ExportedFile> {
        self.actor_handle.export().await
    }

    /// Document in its export shape
    pub async fn document_json(&self) -> CalendarResult<Value> {
        self.actor_handle.document_json().await
    }

    pub async fn summary(&self) -> CalendarResult<SessionSummary> {
        self.actor_handle.summary().await
    }

    pub async fn draft(&self) -> CalendarResult<Draft> {
        self.actor_handle.draft().await
    }

    pub async fn patch_draft(&self, patch: DraftPatch) -> CalendarResult<Draft> {
        self.actor_handle.patch_draft(patch).await
    }

    pub async fn clear_draft(&self) -> CalendarResult<Draft> {
        self.actor_handle.clear_draft().await
    }

    /// Validate the draft and create or update its event
    pub async fn save(&self) -> CalendarResult<SaveOutcome> {
        self.actor_handle.save().await
    }

    /// Delete the event open in the form
    pub async fn delete_selected(&self, confirmed: bool) -> CalendarResult<DeleteOutcome> {
        self.actor_handle.delete_selected(confirmed).await
    }

    pub async fn event_click(&self, report: WidgetEventReport) -> CalendarResult<Draft> {
        self.actor_handle.event_click(report).await
    }

    pub async fn timeline_click(&self, id: EventId) -> CalendarResult<Draft> {
        self.actor_handle.timeline_click(id).await
    }

    pub async fn date_click(&self, date: impl Into<String>) -> CalendarResult<Draft> {
        self.actor_handle.date_click(date.into()).await
    }

    pub async fn date_select(
        &self,
        start: impl Into<String>,
        end: impl Into<String>,
    ) -> CalendarResult<Draft> {
        self.actor_handle.date_select(start.into(), end.into()).await
    }

    /// Commit a drag-and-drop move
    pub async fn event_drop(&self, report: WidgetEventReport) -> CalendarResult<Event> {
        self.actor_handle.event_drop(report).await
    }

    pub async fn widget_events(&self) -> CalendarResult<Arc<Vec<WidgetEvent>>> {
        self.actor_handle.widget_events().await
    }

    pub async fn timeline(&self) -> CalendarResult<TimelineView> {
        self.actor_handle.timeline().await
    }

    pub async fn category_chips(&self) -> CalendarResult<Vec<CategoryChip>> {
        self.actor_handle.category_chips().await
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> CalendarResult<()> {
        self.actor_handle.shutdown().await
    }
}
