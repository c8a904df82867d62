use crate::model::{Category, Document, EventId};
use crate::utils::color::{faded, ON_COLOR_TEXT};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

/// Change counters of the document parts projections depend on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Revision {
    pub events: u64,
    pub categories: u64,
}

/// Last computed value of a projection and the revision it was built from.
///
/// A view is only rebuilt after `events` or `categories` changed.
#[derive(Debug)]
pub struct Memo<T> {
    entry: Option<(Revision, Arc<T>)>,
}

impl<T> Default for Memo<T> {
    fn default() -> Self {
        Self { entry: None }
    }
}

impl<T> Memo<T> {
    /// Return the cached value for `revision`, computing it when stale
    pub fn get_or_compute(&mut self, revision: Revision, compute: impl FnOnce() -> T) -> Arc<T> {
        match &self.entry {
            Some((cached, value)) if *cached == revision => Arc::clone(value),
            _ => {
                let value = Arc::new(compute());
                self.entry = Some((revision, Arc::clone(&value)));
                value
            }
        }
    }
}

/// Event object handed to the calendar widget
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetEvent {
    pub id: String,
    pub title: String,
    pub start: NaiveDate,
    /// Exclusive end; absent for single-day events
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<NaiveDate>,
    pub background_color: String,
    pub border_color: String,
    pub text_color: String,
    pub extended_props: WidgetEventProps,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WidgetEventProps {
    pub category: String,
    pub description: Option<String>,
    pub location: Option<String>,
}

/// One card of the vertical timeline
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    pub id: EventId,
    pub title: String,
    pub start: NaiveDate,
    /// Inclusive last day
    pub end: Option<NaiveDate>,
    /// Whether the card shows an end date next to the start
    pub show_end: bool,
    pub color: String,
    /// Category name, or the raw category id when it is unknown
    pub category_label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Timeline entries plus the card currently open in the form
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineView {
    pub active_id: Option<EventId>,
    pub entries: Arc<Vec<TimelineEntry>>,
}

/// Category button of the form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryChip {
    pub id: String,
    pub name: String,
    pub color: String,
    pub selected: bool,
    pub background: String,
    pub text_color: String,
    pub border_color: String,
}

fn category_lookup(categories: &[Category]) -> HashMap<&str, &Category> {
    // Later duplicates win, like a plain id -> category map
    categories
        .iter()
        .map(|category| (category.id.as_str(), category))
        .collect()
}

/// Events in the widget's exclusive-end convention
pub fn widget_events(document: &Document, fallback_color: &str) -> Vec<WidgetEvent> {
    let lookup = category_lookup(&document.categories);

    document
        .events
        .iter()
        .map(|event| {
            let color = lookup
                .get(event.category.as_str())
                .map(|category| category.color.clone())
                .filter(|color| !color.is_empty())
                .unwrap_or_else(|| fallback_color.to_string());

            WidgetEvent {
                id: event.id.to_string(),
                title: event.title.clone(),
                start: event.start,
                end: event.widget_end(),
                background_color: color.clone(),
                border_color: color,
                text_color: ON_COLOR_TEXT.to_string(),
                extended_props: WidgetEventProps {
                    category: event.category.clone(),
                    description: event.description.clone(),
                    location: event.location.clone(),
                },
            }
        })
        .collect()
}

/// Events ordered by start date; equal dates keep document order
pub fn timeline(document: &Document, fallback_color: &str) -> Vec<TimelineEntry> {
    let lookup = category_lookup(&document.categories);
    let non_blank = |text: &Option<String>| text.clone().filter(|t| !t.trim().is_empty());

    let mut entries: Vec<TimelineEntry> = document
        .events
        .iter()
        .map(|event| {
            let category = lookup.get(event.category.as_str());
            TimelineEntry {
                id: event.id,
                title: event.title.clone(),
                start: event.start,
                end: event.end,
                show_end: event.is_multi_day(),
                color: category
                    .map(|c| c.color.clone())
                    .filter(|color| !color.is_empty())
                    .unwrap_or_else(|| fallback_color.to_string()),
                category_label: category
                    .map(|c| c.name.clone())
                    .unwrap_or_else(|| event.category.clone()),
                description: non_blank(&event.description),
                location: non_blank(&event.location),
            }
        })
        .collect();

    entries.sort_by_key(|entry| entry.start);
    entries
}

/// Category buttons, highlighting the one chosen in the form
pub fn category_chips(document: &Document, selected: Option<&str>) -> Vec<CategoryChip> {
    document
        .categories
        .iter()
        .map(|category| {
            let is_selected = selected == Some(category.id.as_str());
            CategoryChip {
                id: category.id.clone(),
                name: category.name.clone(),
                color: category.color.clone(),
                selected: is_selected,
                background: if is_selected {
                    category.color.clone()
                } else {
                    faded(&category.color)
                },
                text_color: if is_selected {
                    ON_COLOR_TEXT.to_string()
                } else {
                    category.color.clone()
                },
                border_color: category.color.clone(),
            }
        })
        .collect()
}
