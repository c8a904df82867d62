use super::category::Category;
use super::event::{Event, EventId};
use crate::error::{malformed_error, CalendarResult, Error};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Which key pair a document uses for event dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldNaming {
    /// `date` / `endDate`
    #[default]
    DateEndDate,
    /// `start` / `end`
    StartEnd,
}

impl FieldNaming {
    /// JSON keys for the start and the inclusive end
    pub fn keys(self) -> (&'static str, &'static str) {
        match self {
            FieldNaming::DateEndDate => ("date", "endDate"),
            FieldNaming::StartEnd => ("start", "end"),
        }
    }

    /// Guess the naming from raw event objects.
    ///
    /// The first event carrying either start key decides.
    fn detect(events: &[Value]) -> Option<Self> {
        events.iter().filter_map(Value::as_object).find_map(|event| {
            if event.contains_key("date") {
                Some(FieldNaming::DateEndDate)
            } else if event.contains_key("start") {
                Some(FieldNaming::StartEnd)
            } else {
                None
            }
        })
    }
}

impl fmt::Display for FieldNaming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldNaming::DateEndDate => write!(f, "date-end-date"),
            FieldNaming::StartEnd => write!(f, "start-end"),
        }
    }
}

impl FromStr for FieldNaming {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "date-end-date" | "date" => Ok(FieldNaming::DateEndDate),
            "start-end" | "start" => Ok(FieldNaming::StartEnd),
            other => Err(Error::Config(format!(
                "unknown field naming {:?}; expected date-end-date or start-end",
                other
            ))),
        }
    }
}

/// Descriptive metadata of the semester, passed through unchanged
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Semester {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Categories, events and optional semester metadata
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub semester: Option<Semester>,
    pub categories: Vec<Category>,
    pub events: Vec<Event>,
}

/// Result of parsing an imported file
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDocument {
    pub document: Document,
    /// `None` when no event carried a start key
    pub naming: Option<FieldNaming>,
}

impl Document {
    /// Parse an imported calendar file.
    ///
    /// Missing or non-list `categories`/`events` become empty lists. Any entry
    /// that cannot be decoded fails the whole import.
    pub fn from_json_str(contents: &str) -> CalendarResult<ParsedDocument> {
        let value: Value =
            serde_json::from_str(contents).map_err(|e| Error::InvalidJson(e.to_string()))?;

        let mut root = match value {
            Value::Object(root) => root,
            other => {
                return Err(malformed_error(&format!(
                    "top-level value must be an object, found {}",
                    json_kind(&other)
                )))
            }
        };

        let semester = match root.remove("semester") {
            None | Some(Value::Null) => None,
            Some(value @ Value::Object(_)) => Some(
                serde_json::from_value::<Semester>(value)
                    .map_err(|e| malformed_error(&format!("semester: {}", e)))?,
            ),
            Some(other) => {
                return Err(malformed_error(&format!(
                    "semester must be an object, found {}",
                    json_kind(&other)
                )))
            }
        };

        let raw_categories = take_list(&mut root, "categories");
        let raw_events = take_list(&mut root, "events");
        let naming = FieldNaming::detect(&raw_events);

        let categories: Vec<Category> =
            decode_entries(raw_categories, "category", serde_json::from_value)?;
        let events = decode_entries(raw_events, "event", Event::from_json_value)?;

        Ok(ParsedDocument {
            document: Document {
                semester,
                categories,
                events,
            },
            naming,
        })
    }

    /// Build the export value: `{semester?, categories, events}`
    pub fn to_json_value(&self, naming: FieldNaming) -> CalendarResult<Value> {
        let mut root = Map::new();
        if let Some(semester) = &self.semester {
            root.insert("semester".to_string(), serde_json::to_value(semester)?);
        }
        root.insert(
            "categories".to_string(),
            serde_json::to_value(&self.categories)?,
        );

        let events = self
            .events
            .iter()
            .map(|event| event.to_json_value().map(|value| rename_date_keys(value, naming)))
            .collect::<Result<Vec<_>, _>>()?;
        root.insert("events".to_string(), Value::Array(events));

        Ok(Value::Object(root))
    }

    /// Serialize as two-space indented JSON
    pub fn to_json_pretty(&self, naming: FieldNaming) -> CalendarResult<String> {
        Ok(serde_json::to_string_pretty(&self.to_json_value(naming)?)?)
    }

    /// Id for the next created event: highest id plus one, or 1
    pub fn next_event_id(&self) -> CalendarResult<EventId> {
        match self.events.iter().map(|event| event.id).max() {
            None => Ok(1),
            Some(max) => max.checked_add(1).ok_or(Error::IdExhausted),
        }
    }

    /// Find an event by id
    pub fn event(&self, id: EventId) -> Option<&Event> {
        self.events.iter().find(|event| event.id == id)
    }

    /// Find an event by id for mutation
    pub fn event_mut(&mut self, id: EventId) -> Option<&mut Event> {
        self.events.iter_mut().find(|event| event.id == id)
    }

    /// Remove an event by id
    pub fn remove_event(&mut self, id: EventId) -> Option<Event> {
        let index = self.events.iter().position(|event| event.id == id)?;
        Some(self.events.remove(index))
    }

    /// Find a category by id
    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|category| category.id == id)
    }

    /// Semester display name, if any
    pub fn semester_name(&self) -> Option<&str> {
        self.semester.as_ref().and_then(|s| s.name.as_deref())
    }
}

fn take_list(root: &mut Map<String, Value>, key: &str) -> Vec<Value> {
    match root.remove(key) {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    }
}

fn decode_entries<T, F>(items: Vec<Value>, what: &str, decode: F) -> CalendarResult<Vec<T>>
where
    F: Fn(Value) -> serde_json::Result<T>,
{
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            decode(item)
                .map_err(|e| malformed_error(&format!("{} #{}: {}", what, index + 1, e)))
        })
        .collect()
}

/// Swap the canonical `date`/`endDate` keys for the requested naming,
/// keeping key order.
fn rename_date_keys(value: Value, naming: FieldNaming) -> Value {
    let (start_key, end_key) = naming.keys();
    match value {
        Value::Object(map) if naming != FieldNaming::DateEndDate => Value::Object(
            map.into_iter()
                .map(|(key, value)| match key.as_str() {
                    "date" => (start_key.to_string(), value),
                    "endDate" => (end_key.to_string(), value),
                    _ => (key, value),
                })
                .collect(),
        ),
        other => other,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
