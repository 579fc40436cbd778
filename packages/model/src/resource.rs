//! External resource bindings.
//!
//! Assets (files, images, caption tracks) live outside the document. A node
//! or mark attribute only holds a reference to them by durable id, and the
//! only thing derived from that id is its path under [`ASSET_PREFIX`].

use crate::error::ModelError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const ASSET_PREFIX: &str = "/assets/";

/// Path of the asset with the given id. Never fails: an empty id produces a
/// syntactically valid path that resolves to nothing.
pub fn asset_path(id: &str) -> String {
    format!("{}{}", ASSET_PREFIX, id)
}

/// Inverse of [`asset_path`]
pub fn asset_id(path: &str) -> Option<&str> {
    path.strip_prefix(ASSET_PREFIX)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRef {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl ResourceRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: None,
            filename: None,
            mime_type: None,
            size: None,
        }
    }

    /// Build a reference from a file object handed over by the host's file
    /// picker. Only `id` is required; `filename_download` and `filesize` are
    /// accepted as aliases of `filename` and `size`.
    pub fn from_file_object(file: &Value) -> Result<Self, ModelError> {
        let object = file.as_object().ok_or(ModelError::NotAnObject)?;
        let id = match object.get("id") {
            Some(Value::String(id)) => id.clone(),
            Some(Value::Number(id)) => id.to_string(),
            _ => return Err(ModelError::MissingResourceId),
        };
        let string = |keys: &[&str]| {
            keys.iter()
                .find_map(|key| object.get(*key).and_then(Value::as_str))
                .map(str::to_string)
        };
        let size = ["size", "filesize"].iter().find_map(|key| match object.get(*key) {
            Some(Value::Number(n)) => n.as_u64(),
            Some(Value::String(s)) => s.parse().ok(),
            _ => None,
        });

        Ok(Self {
            id,
            title: string(&["title"]),
            filename: string(&["filename", "filename_download"]),
            mime_type: string(&["type"]),
            size,
        })
    }

    /// Recomputed on every call so it always follows `id`
    pub fn path(&self) -> String {
        asset_path(&self.id)
    }

    /// Filename if known, otherwise the title, otherwise the id
    pub fn display_name(&self) -> &str {
        self.filename
            .as_deref()
            .or(self.title.as_deref())
            .unwrap_or(&self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_path_follows_id() {
        let mut resource = ResourceRef::new("abc");
        assert_eq!(resource.path(), "/assets/abc");

        resource.id = "abc2".to_string();
        assert_eq!(resource.path(), "/assets/abc2");
        assert_eq!(asset_id(&resource.path()), Some("abc2"));
    }

    #[test]
    fn test_from_file_object_aliases() {
        let file = json!({
            "id": "f1",
            "title": "Report",
            "filename_download": "report.pdf",
            "type": "application/pdf",
            "filesize": 2048
        });
        let resource = ResourceRef::from_file_object(&file).unwrap();

        assert_eq!(resource.filename.as_deref(), Some("report.pdf"));
        assert_eq!(resource.mime_type.as_deref(), Some("application/pdf"));
        assert_eq!(resource.size, Some(2048));
        assert_eq!(resource.display_name(), "report.pdf");
    }

    #[test]
    fn test_from_file_object_requires_id() {
        assert_eq!(
            ResourceRef::from_file_object(&json!({"title": "x"})),
            Err(ModelError::MissingResourceId)
        );
        assert_eq!(
            ResourceRef::from_file_object(&json!("abc")),
            Err(ModelError::NotAnObject)
        );
    }

    #[test]
    fn test_empty_id_gives_dead_path() {
        assert_eq!(asset_path(""), "/assets/");
    }
}
