pub mod category;
pub mod document;
pub mod draft;
pub mod event;
pub mod issues;

pub use category::{Category, CategoryId};
pub use document::{Document, FieldNaming, ParsedDocument, Semester};
pub use draft::{Draft, DraftPatch, EventForm, ValidForm};
pub use event::{Event, EventId};
pub use issues::DocumentIssue;
