use super::projection::{CategoryChip, TimelineView, WidgetEvent};
use super::session::{
    DeleteOutcome, EditorSession, ExportedFile, ImportSummary, SaveOutcome, SessionSettings,
    SessionSummary, WidgetEventReport,
};
use crate::error::{editor_error, CalendarResult};
use crate::model::{Draft, DraftPatch, Event, EventId};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

type Reply<T> = mpsc::Sender<CalendarResult<T>>;

/// The editor actor that owns the session and applies commands in order
pub struct EditorActor {
    session: EditorSession,
    command_rx: mpsc::Receiver<EditorCommand>,
}

/// Commands that can be sent to the editor actor
pub enum EditorCommand {
    Import(Option<String>, String, Reply<ImportSummary>),
    Export(Reply<ExportedFile>),
    DocumentJson(Reply<Value>),
    Summary(Reply<SessionSummary>),
    GetDraft(Reply<Draft>),
    PatchDraft(DraftPatch, Reply<Draft>),
    ClearDraft(Reply<Draft>),
    Save(Reply<SaveOutcome>),
    DeleteSelected(bool, Reply<DeleteOutcome>),
    EventClick(WidgetEventReport, Reply<Draft>),
    TimelineClick(EventId, Reply<Draft>),
    DateClick(String, Reply<Draft>),
    DateSelect(String, String, Reply<Draft>),
    EventDrop(WidgetEventReport, Reply<Event>),
    WidgetEvents(Reply<Arc<Vec<WidgetEvent>>>),
    Timeline(Reply<TimelineView>),
    CategoryChips(Reply<Vec<CategoryChip>>),
    Shutdown,
}

/// Handle for communicating with the editor actor
#[derive(Clone)]
pub struct EditorActorHandle {
    command_tx: mpsc::Sender<EditorCommand>,
}

impl EditorActorHandle {
    /// Send a command and wait for its reply
    async fn request<T>(
        &self,
        command: impl FnOnce(Reply<T>) -> EditorCommand,
    ) -> CalendarResult<T> {
        let (response_tx, mut response_rx) = mpsc::channel(1);
        self.command_tx
            .send(command(response_tx))
            .await
            .map_err(|e| editor_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| editor_error("Response channel closed"))?
    }

    pub async fn import(
        &self,
        file_name: Option<String>,
        contents: String,
    ) -> CalendarResult<ImportSummary> {
        self.request(|tx| EditorCommand::Import(file_name, contents, tx))
            .await
    }

    pub async fn export(&self) -> CalendarResult<ExportedFile> {
        self.request(EditorCommand::Export).await
    }

    pub async fn document_json(&self) -> CalendarResult<Value> {
        self.request(EditorCommand::DocumentJson).await
    }

    pub async fn summary(&self) -> CalendarResult<SessionSummary> {
        self.request(EditorCommand::Summary).await
    }

    pub async fn draft(&self) -> CalendarResult<Draft> {
        self.request(EditorCommand::GetDraft).await
    }

    pub async fn patch_draft(&self, patch: DraftPatch) -> CalendarResult<Draft> {
        self.request(|tx| EditorCommand::PatchDraft(patch, tx)).await
    }

    pub async fn clear_draft(&self) -> CalendarResult<Draft> {
        self.request(EditorCommand::ClearDraft).await
    }

    pub async fn save(&self) -> CalendarResult<SaveOutcome> {
        self.request(EditorCommand::Save).await
    }

    pub async fn delete_selected(&self, confirmed: bool) -> CalendarResult<DeleteOutcome> {
        self.request(|tx| EditorCommand::DeleteSelected(confirmed, tx))
            .await
    }

    pub async fn event_click(&self, report: WidgetEventReport) -> CalendarResult<Draft> {
        self.request(|tx| EditorCommand::EventClick(report, tx)).await
    }

    pub async fn timeline_click(&self, id: EventId) -> CalendarResult<Draft> {
        self.request(|tx| EditorCommand::TimelineClick(id, tx)).await
    }

    pub async fn date_click(&self, date: String) -> CalendarResult<Draft> {
        self.request(|tx| EditorCommand::DateClick(date, tx)).await
    }

    pub async fn date_select(&self, start: String, end: String) -> CalendarResult<Draft> {
        self.request(|tx| EditorCommand::DateSelect(start, end, tx))
            .await
    }

    pub async fn event_drop(&self, report: WidgetEventReport) -> CalendarResult<Event> {
        self.request(|tx| EditorCommand::EventDrop(report, tx)).await
    }

    pub async fn widget_events(&self) -> CalendarResult<Arc<Vec<WidgetEvent>>> {
        self.request(EditorCommand::WidgetEvents).await
    }

    pub async fn timeline(&self) -> CalendarResult<TimelineView> {
        self.request(EditorCommand::Timeline).await
    }

    pub async fn category_chips(&self) -> CalendarResult<Vec<CategoryChip>> {
        self.request(EditorCommand::CategoryChips).await
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> CalendarResult<()> {
        let _ = self.command_tx.send(EditorCommand::Shutdown).await;
        Ok(())
    }
}

impl EditorActor {
    /// Create a new actor and return its handle
    pub fn new(settings: SessionSettings) -> (Self, EditorActorHandle) {
        let (command_tx, command_rx) = mpsc::channel(32);

        let actor = Self {
            session: EditorSession::new(settings),
            command_rx,
        };

        let handle = EditorActorHandle { command_tx };

        (actor, handle)
    }

    /// Start the actor's processing loop
    pub async fn run(&mut self) {
        info!("Editor actor started");

        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                EditorCommand::Import(file_name, contents, response_tx) => {
                    debug!("Importing {} bytes", contents.len());
                    let result = self.session.import(file_name, &contents);
                    let _ = response_tx.send(result).await;
                }
                EditorCommand::Export(response_tx) => {
                    let _ = response_tx.send(self.session.export()).await;
                }
                EditorCommand::DocumentJson(response_tx) => {
                    let _ = response_tx.send(self.session.document_json()).await;
                }
                EditorCommand::Summary(response_tx) => {
                    let _ = response_tx.send(Ok(self.session.summary())).await;
                }
                EditorCommand::GetDraft(response_tx) => {
                    let _ = response_tx.send(Ok(self.session.draft().clone())).await;
                }
                EditorCommand::PatchDraft(patch, response_tx) => {
                    let draft = self.session.patch_draft(patch).clone();
                    let _ = response_tx.send(Ok(draft)).await;
                }
                EditorCommand::ClearDraft(response_tx) => {
                    self.session.clear_draft();
                    let _ = response_tx.send(Ok(self.session.draft().clone())).await;
                }
                EditorCommand::Save(response_tx) => {
                    let _ = response_tx.send(self.session.save()).await;
                }
                EditorCommand::DeleteSelected(confirmed, response_tx) => {
                    let _ = response_tx
                        .send(Ok(self.session.delete_selected(confirmed)))
                        .await;
                }
                EditorCommand::EventClick(report, response_tx) => {
                    let result = self.session.event_click(&report).cloned();
                    let _ = response_tx.send(result).await;
                }
                EditorCommand::TimelineClick(id, response_tx) => {
                    let result = self.session.timeline_click(id).cloned();
                    let _ = response_tx.send(result).await;
                }
                EditorCommand::DateClick(date, response_tx) => {
                    let result = self.session.date_click(&date).cloned();
                    let _ = response_tx.send(result).await;
                }
                EditorCommand::DateSelect(start, end, response_tx) => {
                    let result = self.session.date_select(&start, &end).cloned();
                    let _ = response_tx.send(result).await;
                }
                EditorCommand::EventDrop(report, response_tx) => {
                    let _ = response_tx.send(self.session.event_drop(&report)).await;
                }
                EditorCommand::WidgetEvents(response_tx) => {
                    let _ = response_tx.send(Ok(self.session.widget_events())).await;
                }
                EditorCommand::Timeline(response_tx) => {
                    let _ = response_tx.send(Ok(self.session.timeline())).await;
                }
                EditorCommand::CategoryChips(response_tx) => {
                    let _ = response_tx.send(Ok(self.session.category_chips())).await;
                }
                EditorCommand::Shutdown => {
                    info!("Editor actor shutting down");
                    break;
                }
            }
        }

        info!("Editor actor shut down");
    }
}
