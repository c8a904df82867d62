use super::projection::{
    category_chips, timeline, widget_events, CategoryChip, Memo, Revision, TimelineEntry,
    TimelineView, WidgetEvent,
};
use crate::config::{Config, DEFAULT_EXPORT_NAME};
use crate::error::{widget_error, CalendarResult, Error};
use crate::model::{Document, Draft, DraftPatch, Event, EventForm, EventId, FieldNaming};
use crate::utils::color::DEFAULT_FALLBACK_COLOR;
use crate::utils::time::{format_date, format_optional_date, parse_widget_date, to_inclusive};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

/// Session settings taken from the config
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    pub fallback_color: String,
    pub default_export_name: String,
    pub default_field_naming: FieldNaming,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            fallback_color: DEFAULT_FALLBACK_COLOR.to_string(),
            default_export_name: DEFAULT_EXPORT_NAME.to_string(),
            default_field_naming: FieldNaming::DateEndDate,
        }
    }
}

impl From<&Config> for SessionSettings {
    fn from(config: &Config) -> Self {
        Self {
            fallback_color: config.fallback_color.clone(),
            default_export_name: config.default_export_name.clone(),
            default_field_naming: config.default_field_naming,
        }
    }
}

/// An event as the calendar widget reports it on click or drop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetEventReport {
    pub id: String,
    pub start: String,
    /// Exclusive end, when the widget has one
    #[serde(default)]
    pub end: Option<String>,
}

/// What a successful import replaced the session with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub file_name: Option<String>,
    pub semester_name: Option<String>,
    pub category_count: usize,
    pub event_count: usize,
    pub naming: FieldNaming,
    /// Tolerated problems found in the document
    pub issues: Vec<String>,
}

/// Serialized document ready to be offered as a download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub file_name: String,
    pub contents: String,
}

/// Result of saving the draft
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "id", rename_all = "camelCase")]
pub enum SaveOutcome {
    Created(EventId),
    Updated(EventId),
}

/// Result of a delete request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "event", rename_all = "camelCase")]
pub enum DeleteOutcome {
    /// No stored event was open in the form
    NothingSelected,
    /// The user did not confirm; nothing changed
    Cancelled,
    Deleted(Event),
}

/// Counts and state shown in the editor header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub file_name: Option<String>,
    pub export_name: String,
    pub semester_name: Option<String>,
    pub event_count: usize,
    pub category_count: usize,
    pub editing: bool,
    pub naming: FieldNaming,
}

/// In-memory editing state.
///
/// The document is the single source of truth; widget events and the
/// timeline are recomputed from it whenever a revision counter moves.
#[derive(Debug)]
pub struct EditorSession {
    settings: SessionSettings,
    document: Document,
    naming: FieldNaming,
    file_name: Option<String>,
    draft: Draft,
    /// Highest id handed out since the last import; ids are never reused
    highest_assigned: EventId,
    revision: Revision,
    widget_memo: Memo<Vec<WidgetEvent>>,
    timeline_memo: Memo<Vec<TimelineEntry>>,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(SessionSettings::default())
    }
}

impl EditorSession {
    /// Create an empty session
    pub fn new(settings: SessionSettings) -> Self {
        let naming = settings.default_field_naming;
        Self {
            settings,
            document: Document::default(),
            naming,
            file_name: None,
            draft: Draft::Empty,
            highest_assigned: 0,
            revision: Revision::default(),
            widget_memo: Memo::default(),
            timeline_memo: Memo::default(),
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn revision(&self) -> Revision {
        self.revision
    }

    /// Replace the whole document with a parsed file.
    ///
    /// On any parse failure the session is left exactly as it was.
    pub fn import(&mut self, file_name: Option<String>, contents: &str) -> CalendarResult<ImportSummary> {
        let parsed = Document::from_json_str(contents).inspect_err(|e| {
            warn!("Rejected import of {:?}: {}", file_name, e);
        })?;

        let issues: Vec<String> = parsed
            .document
            .issues()
            .iter()
            .map(|issue| issue.to_string())
            .collect();
        for issue in &issues {
            warn!("Imported document: {}", issue);
        }

        self.document = parsed.document;
        self.naming = parsed.naming.unwrap_or(self.settings.default_field_naming);
        self.file_name = file_name.filter(|name| !name.trim().is_empty());
        self.draft.reset();
        self.highest_assigned = 0;
        self.revision.events += 1;
        self.revision.categories += 1;

        info!(
            "Imported {} events and {} categories from {:?}",
            self.document.events.len(),
            self.document.categories.len(),
            self.file_name
        );

        Ok(ImportSummary {
            file_name: self.file_name.clone(),
            semester_name: self.document.semester_name().map(str::to_string),
            category_count: self.document.categories.len(),
            event_count: self.document.events.len(),
            naming: self.naming,
            issues,
        })
    }

    /// Current document in its export shape
    pub fn document_json(&self) -> CalendarResult<Value> {
        self.document.to_json_value(self.naming)
    }

    /// Serialize the document under the imported or default file name
    pub fn export(&self) -> CalendarResult<ExportedFile> {
        let contents = self.document.to_json_pretty(self.naming)?;
        let file_name = self.export_name();
        info!(
            "Exported {} events as {}",
            self.document.events.len(),
            file_name
        );
        Ok(ExportedFile {
            file_name,
            contents,
        })
    }

    fn export_name(&self) -> String {
        self.file_name
            .clone()
            .unwrap_or_else(|| self.settings.default_export_name.clone())
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            file_name: self.file_name.clone(),
            export_name: self.export_name(),
            semester_name: self.document.semester_name().map(str::to_string),
            event_count: self.document.events.len(),
            category_count: self.document.categories.len(),
            editing: self.draft.editing_id().is_some(),
            naming: self.naming,
        }
    }

    /// Update form fields
    pub fn patch_draft(&mut self, patch: DraftPatch) -> &Draft {
        self.draft.patch(patch);
        &self.draft
    }

    /// Drop the current draft
    pub fn clear_draft(&mut self) {
        self.draft.reset();
    }

    /// Validate the draft and create or update the event
    pub fn save(&mut self) -> CalendarResult<SaveOutcome> {
        let empty = EventForm::default();
        let form = self.draft.form().unwrap_or(&empty);
        let valid = form.validate()?;

        let outcome = match self.draft.editing_id() {
            Some(id) => {
                let event = self
                    .document
                    .event_mut(id)
                    .ok_or(Error::EventNotFound(id))?;
                form.apply_to(event, &valid);
                info!("Updated event {}", id);
                SaveOutcome::Updated(id)
            }
            None => {
                let after_assigned = self
                    .highest_assigned
                    .checked_add(1)
                    .ok_or(Error::IdExhausted)?;
                let id = self.document.next_event_id()?.max(after_assigned);
                self.document.events.push(form.to_new_event(id, &valid));
                self.highest_assigned = id;
                info!("Created event {}", id);
                SaveOutcome::Created(id)
            }
        };

        self.revision.events += 1;
        self.draft.reset();
        Ok(outcome)
    }

    /// Delete the event open in the form, once the user confirmed
    pub fn delete_selected(&mut self, confirmed: bool) -> DeleteOutcome {
        let Some(id) = self.draft.editing_id() else {
            return DeleteOutcome::NothingSelected;
        };
        if !confirmed {
            return DeleteOutcome::Cancelled;
        }

        let outcome = match self.document.remove_event(id) {
            Some(event) => {
                self.revision.events += 1;
                info!("Deleted event {}", id);
                DeleteOutcome::Deleted(event)
            }
            None => {
                warn!("Event {} was already gone when deleting", id);
                DeleteOutcome::NothingSelected
            }
        };
        self.draft.reset();
        outcome
    }

    /// Open a stored event from a widget click.
    ///
    /// Dates come from the report; everything else from the stored event.
    pub fn event_click(&mut self, report: &WidgetEventReport) -> CalendarResult<&Draft> {
        let id = report_id(report)?;
        let (start, end) = report_range(report)?;
        let event = self.document.event(id).ok_or(Error::EventNotFound(id))?;

        let mut form = EventForm::from_event(event);
        form.start = format_date(start);
        form.end = format_optional_date(end);
        self.draft = Draft::Existing { id, form };
        Ok(&self.draft)
    }

    /// Open a stored event from the timeline
    pub fn timeline_click(&mut self, id: EventId) -> CalendarResult<&Draft> {
        let event = self.document.event(id).ok_or(Error::EventNotFound(id))?;
        self.draft = Draft::editing(event);
        Ok(&self.draft)
    }

    /// Start a new record on a clicked day
    pub fn date_click(&mut self, date: &str) -> CalendarResult<&Draft> {
        let start = parse_report_date(date)?;
        self.draft = Draft::new_on(start, None);
        Ok(&self.draft)
    }

    /// Start a new record spanning a selected range (exclusive end)
    pub fn date_select(&mut self, start: &str, exclusive_end: &str) -> CalendarResult<&Draft> {
        let start = parse_report_date(start)?;
        let end = to_inclusive(Some(parse_report_date(exclusive_end)?)).filter(|end| *end > start);
        self.draft = Draft::new_on(start, end);
        Ok(&self.draft)
    }

    /// Move an event to the range the widget reports after a drag.
    ///
    /// Committed immediately; the open form follows along when it shows the
    /// same event.
    pub fn event_drop(&mut self, report: &WidgetEventReport) -> CalendarResult<Event> {
        let id = report_id(report)?;
        let (start, end) = report_range(report)?;
        let event = self
            .document
            .event_mut(id)
            .ok_or(Error::EventNotFound(id))?;

        event.start = start;
        event.end = end;
        let moved = event.clone();

        self.revision.events += 1;
        if self.draft.sync_dates(id, start, end) {
            info!("Moved event {} is open in the form, dates refreshed", id);
        }
        info!(
            "Moved event {} to {}..{}",
            id,
            format_date(start),
            format_date(moved.last_day())
        );
        Ok(moved)
    }

    /// Events for the calendar widget
    pub fn widget_events(&mut self) -> Arc<Vec<WidgetEvent>> {
        let document = &self.document;
        let fallback = &self.settings.fallback_color;
        self.widget_memo
            .get_or_compute(self.revision, || widget_events(document, fallback))
    }

    /// Time-ordered list with the card open in the form
    pub fn timeline(&mut self) -> TimelineView {
        let document = &self.document;
        let fallback = &self.settings.fallback_color;
        let entries = self
            .timeline_memo
            .get_or_compute(self.revision, || timeline(document, fallback));
        TimelineView {
            active_id: self.draft.editing_id(),
            entries,
        }
    }

    /// Category buttons for the form
    pub fn category_chips(&self) -> Vec<CategoryChip> {
        category_chips(&self.document, self.draft.selected_category())
    }
}

fn report_id(report: &WidgetEventReport) -> CalendarResult<EventId> {
    report
        .id
        .trim()
        .parse()
        .map_err(|_| widget_error(&format!("event id {:?} is not a number", report.id)))
}

fn parse_report_date(date: &str) -> CalendarResult<NaiveDate> {
    parse_widget_date(date).ok_or_else(|| widget_error(&format!("unreadable date {:?}", date)))
}

/// Start and inclusive end of a widget report
fn report_range(report: &WidgetEventReport) -> CalendarResult<(NaiveDate, Option<NaiveDate>)> {
    let start = parse_report_date(&report.start)?;
    let end = match report.end.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(end) => to_inclusive(Some(parse_report_date(end)?)),
    };
    Ok((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r##"{
        "categories": [{"id": "c1", "name": "Exam", "color": "#ff0000"}],
        "events": [
            {"id": 3, "title": "Vizsga", "category": "c1", "date": "2024-03-04", "endDate": "2024-03-10"},
            {"id": 7, "title": "Szünet", "category": "", "date": "2024-04-01", "endDate": null, "room": "B2"}
        ]
    }"##;

    fn session() -> EditorSession {
        let mut session = EditorSession::default();
        session.import(Some("tavasz.json".to_string()), DOC).unwrap();
        session
    }

    fn report(id: &str, start: &str, end: Option<&str>) -> WidgetEventReport {
        WidgetEventReport {
            id: id.to_string(),
            start: start.to_string(),
            end: end.map(str::to_string),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_failed_import_keeps_state() {
        let mut session = session();
        session.timeline_click(3).unwrap();
        let before = session.revision();

        assert!(session.import(Some("broken.json".to_string()), "{oops").is_err());
        assert_eq!(session.document().events.len(), 2);
        assert_eq!(session.draft().editing_id(), Some(3));
        assert_eq!(session.revision(), before);
        assert_eq!(session.summary().file_name.as_deref(), Some("tavasz.json"));
    }

    #[test]
    fn test_import_resets_draft() {
        let mut session = session();
        session.timeline_click(3).unwrap();
        let summary = session.import(None, r#"{"events": []}"#).unwrap();

        assert_eq!(summary.event_count, 0);
        assert_eq!(session.draft(), &Draft::Empty);
        assert_eq!(session.export().unwrap().file_name, "naptar.json");
    }

    #[test]
    fn test_save_new_assigns_next_id() {
        let mut session = session();
        session.patch_draft(DraftPatch {
            title: Some("Midterm".to_string()),
            start: Some("2024-05-01".to_string()),
            ..DraftPatch::default()
        });

        assert_eq!(session.save().unwrap(), SaveOutcome::Created(8));
        assert_eq!(session.draft(), &Draft::Empty);
        assert_eq!(session.document().event(8).unwrap().end, None);
    }

    #[test]
    fn test_ids_are_not_reused_after_delete() {
        let mut session = EditorSession::default();
        for title in ["a", "b"] {
            session.date_click("2024-05-01").unwrap();
            session.patch_draft(DraftPatch {
                title: Some(title.to_string()),
                ..DraftPatch::default()
            });
            session.save().unwrap();
        }

        session.timeline_click(2).unwrap();
        assert!(matches!(session.delete_selected(true), DeleteOutcome::Deleted(_)));

        session.date_click("2024-05-02").unwrap();
        session.patch_draft(DraftPatch {
            title: Some("c".to_string()),
            ..DraftPatch::default()
        });
        assert_eq!(session.save().unwrap(), SaveOutcome::Created(3));
    }

    #[test]
    fn test_save_rejects_invalid_draft_without_mutation() {
        let mut session = session();
        let before = session.revision();

        let err = session.save().unwrap_err();
        assert!(matches!(err, Error::Validation(crate::error::ValidationError::MissingTitle)));

        session.patch_draft(DraftPatch {
            title: Some("Midterm".to_string()),
            ..DraftPatch::default()
        });
        let err = session.save().unwrap_err();
        assert!(matches!(err, Error::Validation(crate::error::ValidationError::MissingStartDate)));

        assert_eq!(session.document().events.len(), 2);
        assert_eq!(session.revision(), before);
        assert_eq!(session.draft().form().unwrap().title, "Midterm");
    }

    #[test]
    fn test_update_merges_unknown_fields() {
        let mut session = session();
        session.timeline_click(7).unwrap();
        session.patch_draft(DraftPatch {
            title: Some("Tavaszi szünet".to_string()),
            end: Some("2024-04-05".to_string()),
            ..DraftPatch::default()
        });

        assert_eq!(session.save().unwrap(), SaveOutcome::Updated(7));
        let event = session.document().event(7).unwrap();
        assert_eq!(event.title, "Tavaszi szünet");
        assert_eq!(event.end, Some(date(2024, 4, 5)));
        assert_eq!(event.extra.get("room"), Some(&serde_json::json!("B2")));
    }

    #[test]
    fn test_save_fails_cleanly_when_ids_run_out() {
        let mut session = EditorSession::default();
        let doc = format!(
            r#"{{"events": [{{"id": {}, "title": "Utolsó", "date": "2024-05-01"}}]}}"#,
            EventId::MAX - 1
        );
        session.import(None, &doc).unwrap();

        session.date_click("2024-05-02").unwrap();
        session.patch_draft(DraftPatch {
            title: Some("a".to_string()),
            ..DraftPatch::default()
        });
        assert_eq!(session.save().unwrap(), SaveOutcome::Created(EventId::MAX));

        session.date_click("2024-05-03").unwrap();
        session.patch_draft(DraftPatch {
            title: Some("b".to_string()),
            ..DraftPatch::default()
        });
        let before = session.revision();
        assert!(matches!(session.save(), Err(Error::IdExhausted)));
        assert_eq!(session.document().events.len(), 2);
        assert_eq!(session.revision(), before);
        assert_eq!(session.draft().form().unwrap().title, "b");

        // Deleting the top id does not make it reusable
        session.timeline_click(EventId::MAX).unwrap();
        assert!(matches!(session.delete_selected(true), DeleteOutcome::Deleted(_)));
        session.date_click("2024-05-04").unwrap();
        session.patch_draft(DraftPatch {
            title: Some("c".to_string()),
            ..DraftPatch::default()
        });
        assert!(matches!(session.save(), Err(Error::IdExhausted)));
        assert_eq!(session.document().events.len(), 1);
    }

    #[test]
    fn test_update_of_vanished_event_fails() {
        let mut session = session();
        session.timeline_click(7).unwrap();
        session.document.remove_event(7);

        assert!(matches!(session.save(), Err(Error::EventNotFound(7))));
    }

    #[test]
    fn test_delete_requires_selection_and_confirmation() {
        let mut session = session();
        assert_eq!(session.delete_selected(true), DeleteOutcome::NothingSelected);

        session.timeline_click(3).unwrap();
        assert_eq!(session.delete_selected(false), DeleteOutcome::Cancelled);
        assert_eq!(session.document().events.len(), 2);
        assert_eq!(session.draft().editing_id(), Some(3));

        match session.delete_selected(true) {
            DeleteOutcome::Deleted(event) => assert_eq!(event.id, 3),
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(session.document().events.len(), 1);
        assert_eq!(session.draft(), &Draft::Empty);
    }

    #[test]
    fn test_event_drop_normalizes_exclusive_end() {
        let mut session = session();
        session.timeline_click(3).unwrap();

        let moved = session
            .event_drop(&report("3", "2024-03-05", Some("2024-03-12")))
            .unwrap();
        assert_eq!(moved.start, date(2024, 3, 5));
        assert_eq!(moved.end, Some(date(2024, 3, 11)));

        let form = session.draft().form().unwrap();
        assert_eq!(form.start, "2024-03-05");
        assert_eq!(form.end, "2024-03-11");
    }

    #[test]
    fn test_event_drop_without_end_is_single_day() {
        let mut session = session();
        session.timeline_click(3).unwrap();

        let moved = session
            .event_drop(&report("7", "2024-04-02T00:00:00+02:00", None))
            .unwrap();
        assert_eq!(moved.start, date(2024, 4, 2));
        assert_eq!(moved.end, None);
        // Form shows a different event and stays as it was
        assert_eq!(session.draft().form().unwrap().start, "2024-03-04");
    }

    #[test]
    fn test_event_drop_rejects_bad_reports() {
        let mut session = session();
        assert!(matches!(
            session.event_drop(&report("x", "2024-04-02", None)),
            Err(Error::WidgetReport(_))
        ));
        assert!(matches!(
            session.event_drop(&report("3", "04/02/2024", None)),
            Err(Error::WidgetReport(_))
        ));
        assert!(matches!(
            session.event_drop(&report("99", "2024-04-02", None)),
            Err(Error::EventNotFound(99))
        ));
    }

    #[test]
    fn test_event_click_reads_dates_from_report() {
        let mut session = session();
        let draft = session
            .event_click(&report("3", "2024-03-04", Some("2024-03-11")))
            .unwrap();

        assert_eq!(draft.editing_id(), Some(3));
        let form = draft.form().unwrap();
        assert_eq!(form.title, "Vizsga");
        assert_eq!(form.category, "c1");
        assert_eq!(form.end, "2024-03-10");
    }

    #[test]
    fn test_date_click_and_select() {
        let mut session = session();
        let draft = session.date_click("2024-05-01").unwrap();
        assert!(matches!(draft, Draft::New { .. }));
        assert_eq!(draft.form().unwrap().start, "2024-05-01");
        assert_eq!(draft.form().unwrap().end, "");

        let draft = session.date_select("2024-05-06", "2024-05-11").unwrap();
        assert_eq!(draft.form().unwrap().end, "2024-05-10");

        let draft = session.date_select("2024-05-06", "2024-05-07").unwrap();
        assert_eq!(draft.form().unwrap().end, "");
    }

    #[test]
    fn test_projections_follow_mutations() {
        let mut session = session();
        let first = session.widget_events();
        let again = session.widget_events();
        assert!(Arc::ptr_eq(&first, &again));
        assert_eq!(first[0].end, Some(date(2024, 3, 11)));

        session
            .event_drop(&report("3", "2024-03-05", Some("2024-03-12")))
            .unwrap();
        let after = session.widget_events();
        assert!(!Arc::ptr_eq(&first, &after));
        assert_eq!(after[0].end, Some(date(2024, 3, 12)));
    }

    #[test]
    fn test_timeline_marks_active_card() {
        let mut session = session();
        assert_eq!(session.timeline().active_id, None);

        session.timeline_click(7).unwrap();
        let view = session.timeline();
        assert_eq!(view.active_id, Some(7));
        assert_eq!(view.entries.len(), 2);
    }

    #[test]
    fn test_category_chips_follow_draft() {
        let mut session = session();
        assert!(!session.category_chips()[0].selected);

        session.patch_draft(DraftPatch {
            category: Some("c1".to_string()),
            ..DraftPatch::default()
        });
        assert!(session.category_chips()[0].selected);
    }

    #[test]
    fn test_export_keeps_file_name_and_naming() {
        let mut session = EditorSession::default();
        session
            .import(
                Some("osz.json".to_string()),
                r#"{"categories": [], "events": [{"id": 1, "title": "A", "start": "2024-09-02", "end": null}]}"#,
            )
            .unwrap();

        let file = session.export().unwrap();
        assert_eq!(file.file_name, "osz.json");
        assert!(file.contents.contains("\"start\": \"2024-09-02\""));
        assert!(!file.contents.contains("\"date\""));
    }
}
