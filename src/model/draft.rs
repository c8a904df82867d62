use super::event::{Event, EventId};
use crate::error::ValidationError;
use crate::utils::time::{format_date, format_optional_date, parse_date};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Form fields as the user types them
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventForm {
    pub title: String,
    pub title_en: String,
    pub category: String,
    pub start: String,
    pub end: String,
    pub description: String,
    pub description_en: String,
    pub location: String,
    pub location_en: String,
    pub link: String,
}

/// Checked form contents ready to be written into an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidForm {
    pub start: NaiveDate,
    pub end: Option<NaiveDate>,
}

impl EventForm {
    /// Fill the form from a stored event
    pub fn from_event(event: &Event) -> Self {
        Self {
            title: event.title.clone(),
            title_en: event.title_en.clone().unwrap_or_default(),
            category: event.category.clone(),
            start: format_date(event.start),
            end: format_optional_date(event.end),
            description: event.description.clone().unwrap_or_default(),
            description_en: event.description_en.clone().unwrap_or_default(),
            location: event.location.clone().unwrap_or_default(),
            location_en: event.location_en.clone().unwrap_or_default(),
            link: event.link.clone().unwrap_or_default(),
        }
    }

    /// Check the fields required to save.
    ///
    /// The title must be non-blank, the start a valid date, and a non-empty
    /// end a valid date too.
    pub fn validate(&self) -> Result<ValidForm, ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::MissingTitle);
        }
        if self.start.trim().is_empty() {
            return Err(ValidationError::MissingStartDate);
        }
        let start = parse_date(&self.start).ok_or_else(|| ValidationError::InvalidDate {
            field: "start",
            value: self.start.clone(),
        })?;
        let end = if self.end.trim().is_empty() {
            None
        } else {
            Some(parse_date(&self.end).ok_or_else(|| ValidationError::InvalidDate {
                field: "end",
                value: self.end.clone(),
            })?)
        };
        Ok(ValidForm { start, end })
    }

    /// Overwrite every form-exposed field of `event`.
    ///
    /// Fields the form does not know about (`extra`) are left alone. Saved
    /// events write all form keys, so blanks remembered from the import are
    /// forgotten.
    pub fn apply_to(&self, event: &mut Event, valid: &ValidForm) {
        event.title = self.title.clone();
        event.title_en = Some(self.title_en.clone());
        event.category = self.category.clone();
        event.start = valid.start;
        event.end = valid.end;
        event.description = Some(self.description.clone());
        event.description_en = Some(self.description_en.clone());
        event.location = Some(self.location.clone());
        event.location_en = Some(self.location_en.clone());
        event.link = Some(self.link.trim())
            .filter(|link| !link.is_empty())
            .map(str::to_string);
        event.blanks.clear();
    }

    /// Build a new event from the form
    pub fn to_new_event(&self, id: EventId, valid: &ValidForm) -> Event {
        let mut event = Event::new(id, self.title.clone(), valid.start);
        self.apply_to(&mut event, valid);
        event
    }
}

/// Partial form update; `None` leaves the field as is
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DraftPatch {
    pub title: Option<String>,
    pub title_en: Option<String>,
    pub category: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub description: Option<String>,
    pub description_en: Option<String>,
    pub location: Option<String>,
    pub location_en: Option<String>,
    pub link: Option<String>,
}

impl DraftPatch {
    fn apply(self, form: &mut EventForm) {
        let fields = [
            (self.title, &mut form.title),
            (self.title_en, &mut form.title_en),
            (self.category, &mut form.category),
            (self.start, &mut form.start),
            (self.end, &mut form.end),
            (self.description, &mut form.description),
            (self.description_en, &mut form.description_en),
            (self.location, &mut form.location),
            (self.location_en, &mut form.location_en),
            (self.link, &mut form.link),
        ];
        for (value, slot) in fields {
            if let Some(value) = value {
                *slot = value;
            }
        }
    }
}

/// What the form is currently editing
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum Draft {
    /// Nothing typed, nothing selected
    #[default]
    Empty,
    /// A record that has not been saved yet
    New { form: EventForm },
    /// A copy of a stored event pending update
    Existing { id: EventId, form: EventForm },
}

impl Draft {
    /// Start a new record on the given day
    pub fn new_on(start: NaiveDate, end: Option<NaiveDate>) -> Self {
        Draft::New {
            form: EventForm {
                start: format_date(start),
                end: format_optional_date(end),
                ..EventForm::default()
            },
        }
    }

    /// Open a stored event for editing
    pub fn editing(event: &Event) -> Self {
        Draft::Existing {
            id: event.id,
            form: EventForm::from_event(event),
        }
    }

    /// Id of the stored event being edited
    pub fn editing_id(&self) -> Option<EventId> {
        match self {
            Draft::Existing { id, .. } => Some(*id),
            _ => None,
        }
    }

    pub fn form(&self) -> Option<&EventForm> {
        match self {
            Draft::Empty => None,
            Draft::New { form } | Draft::Existing { form, .. } => Some(form),
        }
    }

    /// Category currently chosen in the form
    pub fn selected_category(&self) -> Option<&str> {
        self.form()
            .map(|form| form.category.as_str())
            .filter(|category| !category.is_empty())
    }

    /// Apply a field update; an empty draft becomes a new record
    pub fn patch(&mut self, patch: DraftPatch) {
        match self {
            Draft::Empty => {
                let mut form = EventForm::default();
                patch.apply(&mut form);
                *self = Draft::New { form };
            }
            Draft::New { form } | Draft::Existing { form, .. } => patch.apply(form),
        }
    }

    /// Update the form dates in place when it shows the given event
    pub fn sync_dates(&mut self, event_id: EventId, start: NaiveDate, end: Option<NaiveDate>) -> bool {
        match self {
            Draft::Existing { id, form } if *id == event_id => {
                form.start = format_date(start);
                form.end = format_optional_date(end);
                true
            }
            _ => false,
        }
    }

    /// Back to the empty, non-editing state
    pub fn reset(&mut self) {
        *self = Draft::Empty;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn form(title: &str, start: &str) -> EventForm {
        EventForm {
            title: title.to_string(),
            start: start.to_string(),
            ..EventForm::default()
        }
    }

    #[test]
    fn test_validate_requires_title() {
        assert_eq!(
            form("   ", "2024-05-01").validate(),
            Err(ValidationError::MissingTitle)
        );
    }

    #[test]
    fn test_validate_requires_start() {
        assert_eq!(form("Midterm", "").validate(), Err(ValidationError::MissingStartDate));
        assert_eq!(
            form("Midterm", "2024-02-30").validate(),
            Err(ValidationError::InvalidDate {
                field: "start",
                value: "2024-02-30".to_string()
            })
        );
    }

    #[test]
    fn test_validate_checks_non_empty_end() {
        let mut f = form("Midterm", "2024-05-01");
        assert_eq!(
            f.validate(),
            Ok(ValidForm {
                start: date(2024, 5, 1),
                end: None
            })
        );

        f.end = "2024-05-03".to_string();
        assert_eq!(f.validate().unwrap().end, Some(date(2024, 5, 3)));

        f.end = "05/03/2024".to_string();
        assert!(matches!(
            f.validate(),
            Err(ValidationError::InvalidDate { field: "end", .. })
        ));
    }

    #[test]
    fn test_apply_keeps_unknown_fields() {
        let mut event = Event::new(4, "Old", date(2024, 1, 1));
        event.extra.insert("room".to_string(), json!("A/101"));
        event.link = Some("https://old.example".to_string());

        let mut f = form("New", "2024-01-02");
        f.link = "  ".to_string();
        let valid = f.validate().unwrap();
        f.apply_to(&mut event, &valid);

        assert_eq!(event.title, "New");
        assert_eq!(event.start, date(2024, 1, 2));
        assert_eq!(event.link, None);
        assert_eq!(event.description.as_deref(), Some(""));
        assert_eq!(event.extra.get("room"), Some(&json!("A/101")));
    }

    #[test]
    fn test_saved_event_writes_every_form_key() {
        let mut event =
            Event::from_json_value(json!({"id": 4, "title": "Old", "date": "2024-01-01"})).unwrap();

        let f = form("New", "2024-01-02");
        let valid = f.validate().unwrap();
        f.apply_to(&mut event, &valid);

        let value = event.to_json_value().unwrap();
        assert_eq!(value["category"], "");
        assert_eq!(value["endDate"], serde_json::Value::Null);
        assert_eq!(value["link"], serde_json::Value::Null);
        assert_eq!(value["descriptionEn"], "");
    }

    #[test]
    fn test_form_from_event_round_trip() {
        let mut event = Event::new(2, "Exam", date(2024, 6, 3));
        event.end = Some(date(2024, 6, 7));
        event.location = Some("Aula".to_string());

        let f = EventForm::from_event(&event);
        assert_eq!(f.start, "2024-06-03");
        assert_eq!(f.end, "2024-06-07");
        assert_eq!(f.location, "Aula");
        assert_eq!(f.title_en, "");
    }

    #[test]
    fn test_patch_transitions() {
        let mut draft = Draft::Empty;
        draft.patch(DraftPatch {
            title: Some("Midterm".to_string()),
            ..DraftPatch::default()
        });
        assert!(matches!(draft, Draft::New { .. }));
        assert_eq!(draft.form().unwrap().title, "Midterm");

        let event = Event::new(5, "Stored", date(2024, 3, 1));
        let mut draft = Draft::editing(&event);
        draft.patch(DraftPatch {
            category: Some("c1".to_string()),
            ..DraftPatch::default()
        });
        assert_eq!(draft.editing_id(), Some(5));
        assert_eq!(draft.selected_category(), Some("c1"));
        assert_eq!(draft.form().unwrap().title, "Stored");

        draft.reset();
        assert_eq!(draft, Draft::Empty);
        assert_eq!(draft.selected_category(), None);
    }

    #[test]
    fn test_sync_dates_only_touches_matching_event() {
        let event = Event::new(5, "Stored", date(2024, 3, 1));
        let mut draft = Draft::editing(&event);

        assert!(!draft.sync_dates(6, date(2024, 4, 1), None));
        assert_eq!(draft.form().unwrap().start, "2024-03-01");

        assert!(draft.sync_dates(5, date(2024, 4, 1), Some(date(2024, 4, 2))));
        assert_eq!(draft.form().unwrap().start, "2024-04-01");
        assert_eq!(draft.form().unwrap().end, "2024-04-02");
    }

    #[test]
    fn test_draft_serializes_with_state_tag() {
        let value = serde_json::to_value(Draft::new_on(date(2024, 5, 1), None)).unwrap();
        assert_eq!(value["state"], json!("new"));
        assert_eq!(value["form"]["start"], json!("2024-05-01"));
        assert_eq!(value["form"]["titleEn"], json!(""));

        let value = serde_json::to_value(Draft::Empty).unwrap();
        assert_eq!(value, json!({"state": "empty"}));
    }
}
