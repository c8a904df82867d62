use super::document::Document;
use super::event::EventId;
use crate::utils::time::format_date;
use chrono::NaiveDate;
use std::collections::HashSet;
use std::fmt;

/// Problems the document tolerates but a user may want to fix
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentIssue {
    /// `end` is before `start`
    InvertedRange {
        id: EventId,
        start: NaiveDate,
        end: NaiveDate,
    },
    /// Event refers to a category that is not in the document
    DanglingCategory { id: EventId, category: String },
    DuplicateEventId(EventId),
    DuplicateCategoryId(String),
}

impl fmt::Display for DocumentIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentIssue::InvertedRange { id, start, end } => write!(
                f,
                "event {} ends ({}) before it starts ({})",
                id,
                format_date(*end),
                format_date(*start)
            ),
            DocumentIssue::DanglingCategory { id, category } => {
                write!(f, "event {} uses unknown category {:?}", id, category)
            }
            DocumentIssue::DuplicateEventId(id) => write!(f, "event id {} is used more than once", id),
            DocumentIssue::DuplicateCategoryId(id) => {
                write!(f, "category id {:?} is used more than once", id)
            }
        }
    }
}

impl Document {
    /// Collect tolerated inconsistencies, in document order
    pub fn issues(&self) -> Vec<DocumentIssue> {
        let mut issues = Vec::new();

        let mut seen_categories = HashSet::new();
        for category in &self.categories {
            if !seen_categories.insert(category.id.as_str()) {
                issues.push(DocumentIssue::DuplicateCategoryId(category.id.clone()));
            }
        }

        let mut seen_events = HashSet::new();
        for event in &self.events {
            if !seen_events.insert(event.id) {
                issues.push(DocumentIssue::DuplicateEventId(event.id));
            }
            if let Some(end) = event.end.filter(|_| event.has_inverted_range()) {
                issues.push(DocumentIssue::InvertedRange {
                    id: event.id,
                    start: event.start,
                    end,
                });
            }
            if !event.category.is_empty() && !seen_categories.contains(event.category.as_str()) {
                issues.push(DocumentIssue::DanglingCategory {
                    id: event.id,
                    category: event.category.clone(),
                });
            }
        }

        issues
    }
}
