use crate::utils::time::{parse_date, to_exclusive};
use chrono::NaiveDate;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Event identifier, assigned by the document and never by the user
pub type EventId = i64;

/// Keys whose emptiness is remembered from the imported object
const FORM_KEYS: [&str; 9] = [
    "title",
    "titleEn",
    "category",
    "endDate",
    "description",
    "descriptionEn",
    "location",
    "locationEn",
    "link",
];

/// How an empty form key looked in the imported object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlankKey {
    Missing,
    Null,
    Empty,
}

impl BlankKey {
    fn of(value: Option<&Value>) -> Option<Self> {
        match value {
            None => Some(BlankKey::Missing),
            Some(Value::Null) => Some(BlankKey::Null),
            Some(Value::String(s)) if s.is_empty() => Some(BlankKey::Empty),
            Some(_) => None,
        }
    }

    fn restore(self) -> Option<Value> {
        match self {
            BlankKey::Missing => None,
            BlankKey::Null => Some(Value::Null),
            BlankKey::Empty => Some(Value::String(String::new())),
        }
    }
}

/// A dated entry of the semester calendar.
///
/// `start` and `end` are stored under `date`/`endDate`; `start`/`end` are
/// accepted as input aliases, but an object carrying both spellings of the
/// same date is rejected. `end` is the inclusive last day, `None` for
/// single-day events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(rename = "titleEn", default)]
    pub title_en: Option<String>,
    /// Category id, or empty. Not checked against the category list.
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,
    #[serde(rename = "date", alias = "start")]
    pub start: NaiveDate,
    #[serde(
        rename = "endDate",
        alias = "end",
        default,
        deserialize_with = "deserialize_optional_date"
    )]
    pub end: Option<NaiveDate>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "descriptionEn", default)]
    pub description_en: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(rename = "locationEn", default)]
    pub location_en: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    /// Keys the form does not expose; preserved across updates
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    /// Form keys that were missing, `null` or `""` when imported
    #[serde(skip)]
    pub blanks: BTreeMap<&'static str, BlankKey>,
}

impl Event {
    /// Create a single-day event with only the required fields set
    pub fn new(id: EventId, title: impl Into<String>, start: NaiveDate) -> Self {
        Self {
            id,
            title: title.into(),
            title_en: None,
            category: String::new(),
            start,
            end: None,
            description: None,
            description_en: None,
            location: None,
            location_en: None,
            link: None,
            extra: Map::new(),
            blanks: BTreeMap::new(),
        }
    }

    /// Decode an imported event object, remembering its blank form keys
    pub fn from_json_value(value: Value) -> serde_json::Result<Self> {
        let blanks = match value.as_object() {
            Some(object) => FORM_KEYS
                .iter()
                .filter_map(|&key| {
                    let raw = match key {
                        "endDate" => object.get("endDate").or_else(|| object.get("end")),
                        _ => object.get(key),
                    };
                    BlankKey::of(raw).map(|blank| (key, blank))
                })
                .collect(),
            None => BTreeMap::new(),
        };

        let mut event: Event = serde_json::from_value(value)?;
        event.blanks = blanks;
        Ok(event)
    }

    /// Serialize with `date`/`endDate` keys.
    ///
    /// A form key that is still empty is written the way it was imported:
    /// left out, `null` or `""`. Every other empty optional is `null`.
    pub fn to_json_value(&self) -> serde_json::Result<Value> {
        let mut value = serde_json::to_value(self)?;
        if let Value::Object(map) = &mut value {
            for (&key, &blank) in &self.blanks {
                if BlankKey::of(map.get(key)).is_none() {
                    continue;
                }
                match blank.restore() {
                    Some(restored) => {
                        map.insert(key.to_string(), restored);
                    }
                    None => {
                        map.shift_remove(key);
                    }
                }
            }
        }
        Ok(value)
    }

    /// Last day the event is active, inclusive
    pub fn last_day(&self) -> NaiveDate {
        self.end.unwrap_or(self.start)
    }

    /// End date in the widget's exclusive convention
    pub fn widget_end(&self) -> Option<NaiveDate> {
        to_exclusive(self.end)
    }

    /// Whether the stored end precedes the start
    pub fn has_inverted_range(&self) -> bool {
        self.end.is_some_and(|end| end < self.start)
    }

    /// Whether the event spans more than its start day
    pub fn is_multi_day(&self) -> bool {
        self.end.is_some_and(|end| end != self.start)
    }
}

/// Treat JSON `null` like a missing key
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// `null`, `""` and a missing key all mean "no end date"
fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_date(value)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("invalid end date {:?}", value))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_deserialize_date_end_date_keys() {
        let event: Event = serde_json::from_value(json!({
            "id": 3,
            "title": "Vizsgaidőszak",
            "category": "exam",
            "date": "2024-05-20",
            "endDate": "2024-06-28",
            "link": null
        }))
        .unwrap();

        assert_eq!(event.id, 3);
        assert_eq!(event.start, date(2024, 5, 20));
        assert_eq!(event.end, Some(date(2024, 6, 28)));
        assert_eq!(event.link, None);
        assert!(event.extra.is_empty());
    }

    #[test]
    fn test_deserialize_start_end_aliases() {
        let event: Event = serde_json::from_value(json!({
            "id": 1,
            "title": "Regisztráció",
            "category": "",
            "start": "2024-02-05",
            "end": null
        }))
        .unwrap();

        assert_eq!(event.start, date(2024, 2, 5));
        assert_eq!(event.end, None);
    }

    #[test]
    fn test_empty_end_date_means_single_day() {
        let event: Event = serde_json::from_value(json!({
            "id": 1, "title": "A", "date": "2024-02-05", "endDate": ""
        }))
        .unwrap();
        assert_eq!(event.end, None);
        assert_eq!(event.last_day(), date(2024, 2, 5));
        assert_eq!(event.widget_end(), None);
    }

    #[test]
    fn test_invalid_dates_are_rejected() {
        let bad_start = serde_json::from_value::<Event>(json!({
            "id": 1, "title": "A", "date": "2024-02-30"
        }));
        assert!(bad_start.is_err());

        let bad_end = serde_json::from_value::<Event>(json!({
            "id": 1, "title": "A", "date": "2024-02-01", "endDate": "soon"
        }));
        assert!(bad_end.is_err());

        let missing_start = serde_json::from_value::<Event>(json!({"id": 1, "title": "A"}));
        assert!(missing_start.is_err());
    }

    #[test]
    fn test_null_text_fields_default() {
        let event: Event = serde_json::from_value(json!({
            "id": 1, "title": null, "category": null, "date": "2024-02-01"
        }))
        .unwrap();
        assert_eq!(event.title, "");
        assert_eq!(event.category, "");
    }

    #[test]
    fn test_unknown_keys_survive_serialization() {
        let value = json!({
            "id": 9,
            "title": "Szünet",
            "category": "break",
            "date": "2024-04-01",
            "endDate": "2024-04-05",
            "description": "",
            "priority": 2
        });
        let event = Event::from_json_value(value.clone()).unwrap();
        assert_eq!(event.extra.get("priority"), Some(&json!(2)));
        assert_eq!(event.to_json_value().unwrap(), value);
    }

    #[test]
    fn test_serializes_missing_end_as_null() {
        let event = Event::new(1, "Midterm", date(2024, 5, 1));
        let value = event.to_json_value().unwrap();
        assert_eq!(value["endDate"], Value::Null);
        assert_eq!(value["date"], json!("2024-05-01"));
        assert_eq!(value["titleEn"], Value::Null);
        assert_eq!(value["link"], Value::Null);
    }

    #[test]
    fn test_null_link_and_description_round_trip() {
        let value = json!({
            "id": 2,
            "title": "Konzultáció",
            "category": "c1",
            "date": "2024-03-12",
            "endDate": null,
            "description": null,
            "link": null
        });
        let event = Event::from_json_value(value.clone()).unwrap();
        assert_eq!(event.description, None);
        assert_eq!(event.blanks.get("link"), Some(&BlankKey::Null));

        let exported = event.to_json_value().unwrap();
        assert_eq!(exported, value);
        let keys: Vec<&str> = exported.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            ["id", "title", "category", "date", "endDate", "description", "link"]
        );
    }

    #[test]
    fn test_missing_end_date_and_category_stay_missing() {
        let value = json!({"id": 5, "title": "Ünnep", "date": "2024-03-15"});
        let event = Event::from_json_value(value.clone()).unwrap();
        assert_eq!(event.category, "");
        assert_eq!(event.end, None);

        let exported = event.to_json_value().unwrap();
        assert!(exported.get("endDate").is_none());
        assert!(exported.get("category").is_none());
        assert_eq!(exported, value);
    }

    #[test]
    fn test_filled_blank_is_written() {
        let mut event =
            Event::from_json_value(json!({"id": 5, "title": "Ünnep", "date": "2024-03-15"})).unwrap();
        event.end = Some(date(2024, 3, 16));
        event.category = "break".to_string();

        let exported = event.to_json_value().unwrap();
        assert_eq!(exported["endDate"], "2024-03-16");
        assert_eq!(exported["category"], "break");
    }

    #[test]
    fn test_end_alias_blank_is_remembered_as_end_date() {
        let event = Event::from_json_value(json!({
            "id": 1, "title": "A", "category": "", "start": "2024-02-05", "end": ""
        }))
        .unwrap();
        assert_eq!(event.blanks.get("endDate"), Some(&BlankKey::Empty));
        assert_eq!(event.to_json_value().unwrap()["endDate"], "");
    }

    #[test]
    fn test_both_spellings_of_a_date_key_are_rejected() {
        let both_starts = Event::from_json_value(json!({
            "id": 1, "title": "A", "date": "2024-02-05", "start": "2024-02-06"
        }));
        assert!(both_starts.unwrap_err().to_string().contains("duplicate field"));

        let both_ends = Event::from_json_value(json!({
            "id": 1, "title": "A", "date": "2024-02-05", "endDate": null, "end": "2024-02-07"
        }));
        assert!(both_ends.is_err());
    }

    #[test]
    fn test_range_helpers() {
        let mut event = Event::new(1, "Exam week", date(2024, 3, 4));
        assert!(!event.is_multi_day());

        event.end = Some(date(2024, 3, 10));
        assert!(event.is_multi_day());
        assert_eq!(event.last_day(), date(2024, 3, 10));
        assert_eq!(event.widget_end(), Some(date(2024, 3, 11)));
        assert!(!event.has_inverted_range());

        event.end = Some(date(2024, 3, 1));
        assert!(event.has_inverted_range());
    }
}
