mod actor;
mod handle;
pub mod projection;
pub mod session;

pub use handle::EditorHandle;
pub use projection::{CategoryChip, Revision, TimelineEntry, TimelineView, WidgetEvent};
pub use session::{
    DeleteOutcome, EditorSession, ExportedFile, ImportSummary, SaveOutcome, SessionSettings,
    SessionSummary, WidgetEventReport,
};
