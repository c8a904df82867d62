use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Opaque category identifier, unique within a document
pub type CategoryId = String;

/// A category events can be grouped under
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    #[serde(default)]
    pub name: String,
    /// Used for both the selected and the faded state
    #[serde(default)]
    pub color: String,
    /// Keys this editor does not know about, kept for export
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Category {
    /// Create a new category
    pub fn new(id: impl Into<String>, name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: color.into(),
            extra: Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_category_keeps_unknown_keys() {
        let value = json!({"id": "c1", "name": "Exam", "color": "#ff0000", "nameEn": "Exam"});
        let category: Category = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(category.id, "c1");
        assert_eq!(category.extra.get("nameEn"), Some(&json!("Exam")));
        assert_eq!(serde_json::to_value(&category).unwrap(), value);
    }

    #[test]
    fn test_category_requires_id() {
        let result = serde_json::from_value::<Category>(json!({"name": "Exam"}));
        assert!(result.is_err());
    }
}
