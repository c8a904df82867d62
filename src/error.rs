use crate::model::EventId;
use miette::{Diagnostic, Result};
use rust_i18n::t;
use thiserror::Error;

/// Reasons a draft is rejected on save
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("event title is empty")]
    MissingTitle,

    #[error("event start date is missing")]
    MissingStartDate,

    #[error("invalid {field} date: {value:?}")]
    InvalidDate { field: &'static str, value: String },
}

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Invalid JSON: {0}")]
    #[diagnostic(code(calendar::invalid_json))]
    InvalidJson(String),

    #[error("Malformed calendar document: {0}")]
    #[diagnostic(code(calendar::malformed_document))]
    MalformedDocument(String),

    #[error("Validation failed: {0}")]
    #[diagnostic(code(calendar::validation))]
    Validation(#[from] ValidationError),

    #[error("Invalid calendar widget report: {0}")]
    #[diagnostic(code(calendar::widget_report))]
    WidgetReport(String),

    #[error("Event {0} not found")]
    #[diagnostic(code(calendar::event_not_found))]
    EventNotFound(EventId),

    #[error("No event id left above {}", EventId::MAX)]
    #[diagnostic(code(calendar::id_exhausted))]
    IdExhausted,

    #[error("Environment error: {0}")]
    #[diagnostic(code(calendar::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(calendar::config))]
    Config(String),

    #[error("Editor error: {0}")]
    #[diagnostic(code(calendar::editor))]
    Editor(String),

    #[error(transparent)]
    #[diagnostic(code(calendar::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(calendar::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(calendar::other))]
    Other(String),
}

impl Error {
    /// Short machine-readable code, used in API error bodies
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidJson(_) => "invalid_json",
            Error::MalformedDocument(_) => "malformed_document",
            Error::Validation(_) => "validation",
            Error::WidgetReport(_) => "widget_report",
            Error::EventNotFound(_) => "event_not_found",
            Error::IdExhausted => "id_exhausted",
            Error::Environment(_) => "environment",
            Error::Config(_) => "config",
            Error::Editor(_) => "editor",
            Error::Io(_) => "io",
            Error::Serialization(_) => "serialization",
            Error::Other(_) => "other",
        }
    }

    /// User-visible notice in the active locale
    pub fn notice(&self) -> String {
        self.notice_in(&rust_i18n::locale())
    }

    /// User-visible notice in the given locale
    pub fn notice_in(&self, locale: &str) -> String {
        match self {
            Error::InvalidJson(_) | Error::MalformedDocument(_) => {
                t!("notice.invalid_document", locale = locale).to_string()
            }
            Error::Validation(ValidationError::MissingTitle) => {
                t!("notice.missing_title", locale = locale).to_string()
            }
            Error::Validation(ValidationError::MissingStartDate) => {
                t!("notice.missing_start", locale = locale).to_string()
            }
            Error::Validation(ValidationError::InvalidDate { value, .. }) => {
                t!("notice.invalid_date", locale = locale, value = value).to_string()
            }
            Error::WidgetReport(_) => t!("notice.invalid_report", locale = locale).to_string(),
            Error::EventNotFound(id) => {
                t!("notice.event_not_found", locale = locale, id = id).to_string()
            }
            Error::IdExhausted => t!("notice.id_exhausted", locale = locale).to_string(),
            other => t!("notice.internal", locale = locale, detail = other).to_string(),
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type CalendarResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Invalid environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create editor mailbox errors
pub fn editor_error(message: &str) -> Error {
    Error::Editor(message.to_string())
}

/// Helper to create widget report errors
pub fn widget_error(message: &str) -> Error {
    Error::WidgetReport(message.to_string())
}

/// Helper to create malformed document errors
pub fn malformed_error(message: &str) -> Error {
    Error::MalformedDocument(message.to_string())
}
