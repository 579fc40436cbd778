//! Argument builders for the media and link commands.
//!
//! Hosts pick assets and link targets in their own UI; these helpers turn
//! those picks into the argument objects `setVideo` and `setLink` expect.

use crate::builtin::marks::LINK_TYPE_DEFAULT;
use crate::builtin::media::{CAPTIONS_LABEL, CAPTIONS_LANG};
use folio_model::{asset_path, ModelError, ResourceRef};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Arguments for `setVideo`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controls: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autoplay: Option<bool>,
    #[serde(default, rename = "loop", skip_serializing_if = "Option::is_none")]
    pub looping: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub muted: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captions_src: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captions_lang: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captions_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captions_default: Option<bool>,
}

impl VideoRequest {
    /// A freshly picked video file with playback defaults. Any captions
    /// chosen earlier are dropped.
    pub fn select(file: &Value) -> Result<Self, ModelError> {
        let resource = ResourceRef::from_file_object(file)?;
        Ok(Self {
            src: Some(resource.path()),
            filename: resource.filename.clone(),
            id: Some(resource.id),
            controls: Some(true),
            autoplay: Some(false),
            looping: Some(false),
            muted: Some(false),
            ..Self::default()
        })
    }

    /// Attach a captions track, enabled by default
    pub fn select_captions(mut self, file: &Value) -> Result<Self, ModelError> {
        let resource = ResourceRef::from_file_object(file)?;
        self.captions_src = Some(resource.path());
        self.captions_lang = Some(CAPTIONS_LANG.to_string());
        self.captions_label = Some(CAPTIONS_LABEL.to_string());
        self.captions_default = Some(true);
        Ok(self)
    }

    pub fn to_args(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// The kinds of link a host can create
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkKind {
    pub text: &'static str,
    /// Stored as the link's `type`; `None` for free-form links
    pub value: Option<&'static str>,
    pub prefixes: &'static [&'static str],
    pub placeholder: &'static str,
    pub hide_prefix: bool,
    pub no_target: bool,
    pub new_tab_default: bool,
}

pub const LINK_KINDS: [LinkKind; 6] = [
    LinkKind {
        text: "External Link",
        value: Some("external_link"),
        prefixes: &["https://", "http://"],
        placeholder: "https://",
        hide_prefix: false,
        no_target: false,
        new_tab_default: true,
    },
    LinkKind {
        text: "Internal Link",
        value: Some("internal_link"),
        prefixes: &["/"],
        placeholder: "/",
        hide_prefix: false,
        no_target: false,
        new_tab_default: false,
    },
    LinkKind {
        text: "Email",
        value: Some("email"),
        prefixes: &["mailto:"],
        placeholder: "mail@example.com",
        hide_prefix: true,
        no_target: true,
        new_tab_default: false,
    },
    LinkKind {
        text: "Phone",
        value: Some("tel"),
        prefixes: &["tel:"],
        placeholder: "+1234567890",
        hide_prefix: true,
        no_target: true,
        new_tab_default: false,
    },
    LinkKind {
        text: "File",
        value: Some("file"),
        prefixes: &[],
        placeholder: "",
        hide_prefix: true,
        no_target: false,
        new_tab_default: false,
    },
    LinkKind {
        text: "Other",
        value: None,
        prefixes: &[],
        placeholder: "",
        hide_prefix: false,
        no_target: false,
        new_tab_default: false,
    },
];

impl LinkKind {
    /// Kind for a stored `type`; unknown types read as external links
    pub fn find(value: Option<&str>) -> &'static LinkKind {
        LINK_KINDS
            .iter()
            .find(|kind| kind.value == value)
            .unwrap_or(&LINK_KINDS[0])
    }

    /// Target a new link of this kind starts with
    pub fn default_target(&self) -> &'static str {
        if self.new_tab_default {
            "_blank"
        } else {
            "_self"
        }
    }

    /// `href` with this kind's prefix added when the user left it out
    pub fn complete_href(&self, href: &str) -> String {
        match self.prefixes.first() {
            Some(prefix) if !self.prefixes.iter().any(|p| href.starts_with(p)) && !href.is_empty() => {
                format!("{}{}", prefix, href)
            }
            _ => href.to_string(),
        }
    }

    /// `href` as shown to the user
    pub fn display_href<'a>(&self, href: &'a str) -> &'a str {
        if !self.hide_prefix {
            return href;
        }
        self.prefixes
            .iter()
            .find_map(|prefix| href.strip_prefix(prefix))
            .unwrap_or(href)
    }
}

/// Arguments for `setLink`
#[derive(Debug, Clone, PartialEq)]
pub struct LinkRequest {
    pub href: String,
    pub target: String,
    pub rel: String,
    pub title: String,
    pub aria_label: String,
    pub kind: Option<String>,
    pub file: Option<ResourceRef>,
}

impl Default for LinkRequest {
    fn default() -> Self {
        Self {
            href: String::new(),
            target: "_self".to_string(),
            rel: String::new(),
            title: String::new(),
            aria_label: String::new(),
            kind: Some(LINK_TYPE_DEFAULT.to_string()),
            file: None,
        }
    }
}

impl LinkRequest {
    /// Start from the attributes of an existing link mark. A file link
    /// pointing at an asset recovers its file reference.
    pub fn from_attrs(attrs: &folio_model::Attrs) -> Self {
        let text = |key: &str| attrs.get(key).and_then(Value::as_str).unwrap_or_default().to_string();
        let mut request = Self {
            href: text("href"),
            rel: text("rel"),
            title: text("title"),
            aria_label: text("ariaLabel"),
            ..Self::default()
        };
        if let Some(target) = attrs.get("target").and_then(Value::as_str).filter(|t| !t.is_empty()) {
            request.target = target.to_string();
        }
        if let Some(kind) = attrs.get("type").and_then(Value::as_str).filter(|k| !k.is_empty()) {
            request.kind = Some(kind.to_string());
        }
        if request.kind.as_deref() == Some("file") {
            if let Some(id) = folio_model::asset_id(&request.href) {
                let mut file = ResourceRef::new(id);
                file.filename = Some(if request.title.is_empty() {
                    id.to_string()
                } else {
                    request.title.clone()
                });
                request.file = Some(file);
            }
        }
        request
    }

    /// Pick a file to link to
    pub fn select_file(&mut self, file: &Value) -> Result<(), ModelError> {
        let resource = ResourceRef::from_file_object(file)?;
        self.href = resource.path();
        self.file = Some(resource);
        Ok(())
    }

    pub fn link_kind(&self) -> &'static LinkKind {
        LinkKind::find(self.kind.as_deref())
    }

    /// The `setLink` argument object. File links always point at their
    /// asset; kinds without a target store a null one.
    pub fn to_args(&self) -> Value {
        let href = match (&self.file, self.kind.as_deref()) {
            (Some(file), Some("file")) => asset_path(&file.id),
            _ => self.href.clone(),
        };
        let target = if self.link_kind().no_target {
            Value::Null
        } else {
            Value::String(self.target.clone())
        };
        serde_json::json!({
            "href": href,
            "target": target,
            "rel": self.rel,
            "title": self.title,
            "ariaLabel": self.aria_label,
            "type": self.kind,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_video_select_sets_playback_defaults() {
        let request = VideoRequest::select(&json!({"id": "abc", "filename_download": "x.mp4"}))
            .unwrap()
            .select_captions(&json!({"id": "subs"}))
            .unwrap();
        let args = request.to_args();

        assert_eq!(args["src"], "/assets/abc");
        assert_eq!(args["filename"], "x.mp4");
        assert_eq!(args["controls"], true);
        assert_eq!(args["loop"], false);
        assert_eq!(args["captionsSrc"], "/assets/subs");
        assert_eq!(args["captionsLang"], "en");
        assert_eq!(args["captionsLabel"], "English");
        assert_eq!(args["captionsDefault"], true);
    }

    #[test]
    fn test_video_select_requires_id() {
        assert_eq!(
            VideoRequest::select(&json!({"filename": "x.mp4"})),
            Err(ModelError::MissingResourceId)
        );
    }

    #[test]
    fn test_email_links_have_no_target() {
        let request = LinkRequest {
            href: "mailto:me@example.com".to_string(),
            kind: Some("email".to_string()),
            ..LinkRequest::default()
        };
        let args = request.to_args();

        assert_eq!(args["target"], Value::Null);
        assert_eq!(request.link_kind().display_href(&request.href), "me@example.com");
    }

    #[test]
    fn test_file_link_points_at_asset() {
        let mut request = LinkRequest {
            kind: Some("file".to_string()),
            ..LinkRequest::default()
        };
        request.select_file(&json!({"id": "doc1", "title": "Report"})).unwrap();
        assert_eq!(request.to_args()["href"], "/assets/doc1");

        let mut attrs = folio_model::Attrs::new();
        attrs.insert("href".to_string(), json!("/assets/doc1"));
        attrs.insert("type".to_string(), json!("file"));
        let reopened = LinkRequest::from_attrs(&attrs);
        assert_eq!(reopened.file.map(|f| f.id), Some("doc1".to_string()));
        assert_eq!(reopened.target, "_self");
    }

    #[test]
    fn test_link_kinds() {
        assert_eq!(LinkKind::find(Some("tel")).text, "Phone");
        assert_eq!(LinkKind::find(None).text, "Other");
        assert_eq!(LinkKind::find(Some("bogus")).text, "External Link");
        assert_eq!(LinkKind::find(Some("external_link")).default_target(), "_blank");
        assert_eq!(LinkKind::find(Some("external_link")).complete_href("example.com"), "https://example.com");
        assert_eq!(LinkKind::find(Some("external_link")).complete_href("http://a.test"), "http://a.test");
        assert_eq!(LinkKind::find(Some("tel")).complete_href("tel:+1"), "tel:+1");
    }
}
