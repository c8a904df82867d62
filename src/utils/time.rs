use chrono::NaiveDate;

/// Storage and wire format for calendar dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Convert an inclusive last day into the widget's exclusive end.
///
/// Stored events keep the inclusive last day; the widget wants the day after.
pub fn to_exclusive(inclusive_end: Option<NaiveDate>) -> Option<NaiveDate> {
    inclusive_end.and_then(|date| date.succ_opt())
}

/// Convert the widget's exclusive end back into an inclusive last day
pub fn to_inclusive(exclusive_end: Option<NaiveDate>) -> Option<NaiveDate> {
    exclusive_end.and_then(|date| date.pred_opt())
}

/// Parse a strict `YYYY-MM-DD` date
pub fn parse_date(date_str: &str) -> Option<NaiveDate> {
    let trimmed = date_str.trim();
    if trimmed.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT).ok()
}

/// Parse a date string reported by the calendar widget.
///
/// The widget may append a time and offset (`2024-03-10T00:00:00+01:00`);
/// only the leading calendar date is meaningful.
pub fn parse_widget_date(date_str: &str) -> Option<NaiveDate> {
    let trimmed = date_str.trim();
    let date_part = trimmed.get(..10)?;
    match trimmed.as_bytes().get(10) {
        None | Some(b'T') | Some(b' ') => parse_date(date_part),
        Some(_) => None,
    }
}

/// Format a date as `YYYY-MM-DD`
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Format an optional date, empty when unset
pub fn format_optional_date(date: Option<NaiveDate>) -> String {
    date.map(format_date).unwrap_or_default()
}
