use crate::config::ExtensionConfig;
use crate::error::RegistryResult;
use folio_schema::SchemaFragment;
use futures::future::BoxFuture;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Default ordering weight inside a group; higher loads first
pub const DEFAULT_PRIORITY: i32 = 100;

/// Resolution order: every mark extension before every node extension,
/// editor-level extensions last
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtensionGroup {
    Mark,
    Node,
    Editor,
}

impl ExtensionGroup {
    pub fn label(self) -> &'static str {
        match self {
            ExtensionGroup::Mark => "Marks",
            ExtensionGroup::Node => "Nodes",
            ExtensionGroup::Editor => "Editor",
        }
    }
}

impl fmt::Display for ExtensionGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExtensionGroup::Mark => "mark",
            ExtensionGroup::Node => "node",
            ExtensionGroup::Editor => "editor",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    Boolean,
    String,
    Json,
}

/// One configuration key an extension reads
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionField {
    pub field: String,
    pub name: String,
    pub kind: OptionKind,
    pub default: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl OptionField {
    pub fn new(field: &str, name: &str, kind: OptionKind, default: impl Into<Value>) -> Self {
        Self {
            field: field.to_string(),
            name: name.to_string(),
            kind,
            default: default.into(),
            note: None,
        }
    }

    pub fn with_note(mut self, note: &str) -> Self {
        self.note = Some(note.to_string());
        self
    }
}

pub type LoadFuture = BoxFuture<'static, RegistryResult<SchemaFragment>>;
pub type LoadFn = fn(&ExtensionConfig) -> SchemaFragment;
pub type DeferredLoadFn = fn(ExtensionConfig) -> LoadFuture;

/// How an extension turns configuration into a fragment
#[derive(Clone, Copy)]
pub enum Loader {
    Immediate(LoadFn),
    /// Loaded behind a future, e.g. a package fetched on demand
    Deferred(DeferredLoadFn),
}

impl Loader {
    pub fn load(&self, config: &ExtensionConfig) -> LoadFuture {
        match self {
            Loader::Immediate(load) => {
                let fragment = load(config);
                Box::pin(async move { Ok(fragment) })
            }
            Loader::Deferred(load) => load(config.clone()),
        }
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self, Loader::Deferred(_))
    }
}

impl fmt::Debug for Loader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Loader::Immediate(_) => f.write_str("Immediate"),
            Loader::Deferred(_) => f.write_str("Deferred"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExtensionDescriptor {
    pub name: String,
    pub title: String,
    pub package_id: String,
    pub group: ExtensionGroup,
    pub priority: i32,
    pub options: Vec<OptionField>,
    /// Extension-level option values the loader falls back to
    pub defaults: Value,
    pub loader: Loader,
}

impl ExtensionDescriptor {
    pub fn new(name: &str, title: &str, package_id: &str, group: ExtensionGroup, loader: Loader) -> Self {
        Self {
            name: name.to_string(),
            title: title.to_string(),
            package_id: package_id.to_string(),
            group,
            priority: DEFAULT_PRIORITY,
            options: Vec::new(),
            defaults: Value::Object(Default::default()),
            loader,
        }
    }

    pub fn with_option(mut self, option: OptionField) -> Self {
        self.options.push(option);
        self
    }

    pub fn with_defaults(mut self, defaults: Value) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn declares(&self, key: &str) -> bool {
        self.options.iter().any(|option| option.field == key)
    }

    pub fn load(&self, config: &ExtensionConfig) -> LoadFuture {
        self.loader.load(config)
    }

    pub fn summary(&self) -> ExtensionSummary {
        ExtensionSummary {
            name: self.name.clone(),
            title: self.title.clone(),
            package: self.package_id.clone(),
            group: self.group,
            deferred: self.loader.is_deferred(),
            options: self.options.clone(),
        }
    }
}

/// Serializable listing entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtensionSummary {
    pub name: String,
    pub title: String,
    pub package: String,
    pub group: ExtensionGroup,
    pub deferred: bool,
    pub options: Vec<OptionField>,
}
