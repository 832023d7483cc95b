use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::serde_util::null_as_default;

/// Holds all metadata for a schema in Unity Catalog.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Schema {
    pub name: String,
    pub catalog_name: String,
    // The service does not update a null comment, so an empty comment is the default.
    #[serde(default = "empty_comment")]
    pub comment: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub properties: HashMap<String, String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub schema_id: Option<uuid::Uuid>,
}

fn empty_comment() -> Option<String> {
    Some(String::new())
}

impl Schema {
    pub fn new(catalog_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            catalog_name: catalog_name.into(),
            comment: empty_comment(),
            properties: HashMap::new(),
            full_name: None,
            created_at: None,
            updated_at: None,
            schema_id: None,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_properties(mut self, properties: HashMap<String, String>) -> Self {
        self.properties = properties;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_comment_is_empty() {
        let schema = Schema::new("unity", "default");
        assert_eq!(schema.comment.as_deref(), Some(""));

        let decoded: Schema =
            serde_json::from_str(r#"{"name": "default", "catalog_name": "unity"}"#).unwrap();
        assert_eq!(decoded.comment.as_deref(), Some(""));
    }

    #[test]
    fn test_decode_full() {
        let schema: Schema = serde_json::from_value(serde_json::json!({
            "name": "default",
            "catalog_name": "unity",
            "comment": "Default schema",
            "properties": {"k": "v"},
            "full_name": "unity.default",
            "created_at": 1721234405571_i64,
            "updated_at": null,
            "schema_id": "b08dfd57-a939-46cf-b102-9b906b884fae"
        }))
        .unwrap();
        assert_eq!(schema.full_name.as_deref(), Some("unity.default"));
        assert_eq!(schema.properties.get("k").map(String::as_str), Some("v"));
        assert!(schema.schema_id.is_some());
    }
}
