//! # Command table
//!
//! Commands are data: a name plus a [`CommandKind`] describing which
//! structural edit to perform and how call arguments map onto attributes.
//! Definitions carry their commands; the schema builder collects them into
//! one table keyed by name, and the editor executes them.

use folio_model::{asset_path, Attrs};
use serde_json::Value;

/// How call arguments become attributes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgBinding {
    /// Arguments are ignored
    None,
    /// The argument is the value of one attribute (`setParagraphVariant("lead")`).
    /// An object carrying that key is accepted too.
    Value(String),
    /// Object fields renamed to attribute keys (`{before}` → `spaceBefore`)
    Fields(Vec<(String, String)>),
    /// Object whose keys are attribute keys; unknown keys are dropped later
    Object,
    /// Like `Object`, and a resource reference `id` becomes the asset path
    /// stored under the named key (`{id: "abc"}` → `src: "/assets/abc"`)
    Resource(String),
}

impl ArgBinding {
    pub fn fields(pairs: &[(&str, &str)]) -> Self {
        ArgBinding::Fields(
            pairs
                .iter()
                .map(|(field, key)| (field.to_string(), key.to_string()))
                .collect(),
        )
    }

    /// Map `args` to attributes. Errors describe the expected shape.
    pub fn bind(&self, args: &Value) -> Result<Attrs, String> {
        let mut attrs = Attrs::new();
        match self {
            ArgBinding::None => {}
            ArgBinding::Value(key) => {
                let value = match args {
                    Value::Object(object) if object.contains_key(key) => object[key].clone(),
                    Value::Object(_) | Value::Array(_) => {
                        return Err(format!("expected a value for `{}`", key))
                    }
                    other => other.clone(),
                };
                attrs.insert(key.clone(), value);
            }
            ArgBinding::Fields(fields) => match args {
                Value::Object(object) => {
                    for (field, key) in fields {
                        if let Some(value) = object.get(field) {
                            attrs.insert(key.clone(), value.clone());
                        }
                    }
                }
                Value::Null => {}
                _ => {
                    let names: Vec<&str> = fields.iter().map(|(f, _)| f.as_str()).collect();
                    return Err(format!("expected an object with {}", names.join(", ")));
                }
            },
            ArgBinding::Object => match args {
                Value::Object(object) => {
                    attrs.extend(object.iter().map(|(k, v)| (k.clone(), v.clone())));
                }
                Value::Null => {}
                _ => return Err("expected an attribute object".to_string()),
            },
            ArgBinding::Resource(key) => match args {
                Value::Object(object) => {
                    attrs.extend(object.iter().map(|(k, v)| (k.clone(), v.clone())));
                    if let Some(id) = object.get("id").filter(|id| !id.is_null()) {
                        let id = match id {
                            Value::String(id) => id.clone(),
                            other => other.to_string(),
                        };
                        attrs.insert(key.clone(), Value::String(asset_path(&id)));
                    }
                }
                _ => return Err("expected a resource reference object".to_string()),
            },
        }
        Ok(attrs)
    }
}

/// Type names the table commands work with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableTypes {
    pub table: String,
    pub row: String,
    pub cell: String,
    pub header: String,
}

impl Default for TableTypes {
    fn default() -> Self {
        Self {
            table: "table".to_string(),
            row: "tableRow".to_string(),
            cell: "tableCell".to_string(),
            header: "tableHeader".to_string(),
        }
    }
}

/// Type names of the collapsible details structure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailsTypes {
    pub details: String,
    pub summary: String,
    pub content: String,
}

impl Default for DetailsTypes {
    fn default() -> Self {
        Self {
            details: "details".to_string(),
            summary: "detailsSummary".to_string(),
            content: "detailsContent".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommandKind {
    /// Update the nearest ancestor of the owning type
    UpdateAttributes { binding: ArgBinding },

    /// Insert a default-filled node at the selection
    InsertNode { node_type: String, binding: ArgBinding },

    /// Insert an inline atom at the cursor
    InsertInline { node_type: String },

    /// Insert a container pre-filled with `count` columns, each holding one
    /// empty paragraph
    InsertColumns {
        node_type: String,
        column_type: String,
        count_key: String,
        default_count: usize,
    },

    /// Change the column count of the enclosing container
    ResizeColumns {
        node_type: String,
        column_type: String,
        count_key: String,
    },

    /// Delete the nearest enclosing node of the type
    RemoveAncestor { node_type: String },

    /// Update a selected node of the type, otherwise insert one
    Upsert { node_type: String, binding: ArgBinding },

    /// Wrap the selected blocks in a node of the type, or lift them out when
    /// already inside one
    ToggleWrap { node_type: String },

    SetDetails(DetailsTypes),
    UnsetDetails(DetailsTypes),
    /// `UnsetDetails` when `open` was configured or the selection is inside
    /// a details node, `SetDetails` elsewhere
    ToggleDetails { types: DetailsTypes, open: bool },

    /// Turn the selected textblocks into the type
    SetBlockType { node_type: String, binding: ArgBinding },

    /// `SetBlockType`, or back to `fallback` when the blocks already have
    /// the type and attributes
    ToggleBlockType {
        node_type: String,
        fallback: String,
        binding: ArgBinding,
    },

    /// Wrap in a list, lift out of it, or switch list type
    ToggleList { list_type: String, item_type: String },

    InsertTable(TableTypes),
    AddRowAfter(TableTypes),
    DeleteRow(TableTypes),

    SetMark {
        mark: String,
        binding: ArgBinding,
        /// At an empty cursor, act on the whole mark range around it
        extend_empty: bool,
    },
    UnsetMark { mark: String, extend_empty: bool },
    ToggleMark { mark: String, binding: ArgBinding },

    /// Set one attribute of `mark`, keeping its other attributes
    SetMarkAttribute { mark: String, key: String },
    /// Clear one attribute of `mark`, then drop marks left without attributes
    UnsetMarkAttribute { mark: String, key: String },
    /// Drop `mark` wherever all its attributes are null
    RemoveEmptyMark { mark: String },

    /// Set a global attribute on the selected textblocks of `types`
    SetGlobalAttribute {
        key: String,
        types: Vec<String>,
        allowed: Vec<Value>,
    },
    /// Reset a global attribute to its default
    ResetGlobalAttribute { key: String, types: Vec<String> },

    InsertText,

    /// Split the textblock at the cursor; attributes that do not keep on
    /// split reset to their defaults in the new block
    SplitBlock,

    /// Expand the selection over the mark range at the cursor
    ExtendMarkRange,
}

impl CommandKind {
    /// Mark commands do not depend on ancestry
    pub fn is_mark_command(&self) -> bool {
        matches!(
            self,
            CommandKind::SetMark { .. }
                | CommandKind::UnsetMark { .. }
                | CommandKind::ToggleMark { .. }
                | CommandKind::SetMarkAttribute { .. }
                | CommandKind::UnsetMarkAttribute { .. }
                | CommandKind::RemoveEmptyMark { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommandSpec {
    pub name: String,
    pub kind: CommandKind,
}

impl CommandSpec {
    pub fn new(name: impl Into<String>, kind: CommandKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Insert or replace `command` by name
pub fn upsert_command(commands: &mut Vec<CommandSpec>, command: CommandSpec) {
    match commands.iter_mut().find(|existing| existing.name == command.name) {
        Some(existing) => *existing = command,
        None => commands.push(command),
    }
}

/// Mark toggles in the usual `set…`/`unset…`/`toggle…` triple
pub fn mark_commands(mark: &str, title: &str) -> Vec<CommandSpec> {
    vec![
        CommandSpec::new(
            format!("set{}", title),
            CommandKind::SetMark {
                mark: mark.to_string(),
                binding: ArgBinding::Object,
                extend_empty: false,
            },
        ),
        CommandSpec::new(
            format!("unset{}", title),
            CommandKind::UnsetMark {
                mark: mark.to_string(),
                extend_empty: false,
            },
        ),
        CommandSpec::new(
            format!("toggle{}", title),
            CommandKind::ToggleMark {
                mark: mark.to_string(),
                binding: ArgBinding::Object,
            },
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_binding() {
        let binding = ArgBinding::Value("variant".into());

        assert_eq!(binding.bind(&json!("lead")).unwrap()["variant"], json!("lead"));
        assert_eq!(binding.bind(&json!({"variant": "x"})).unwrap()["variant"], json!("x"));
        assert_eq!(binding.bind(&Value::Null).unwrap()["variant"], Value::Null);
        assert!(binding.bind(&json!({"other": 1})).is_err());
    }

    #[test]
    fn test_field_binding_renames() {
        let binding = ArgBinding::fields(&[("before", "spaceBefore"), ("after", "spaceAfter")]);
        let attrs = binding.bind(&json!({"before": "8"})).unwrap();

        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs["spaceBefore"], json!("8"));
        assert!(binding.bind(&json!(3)).is_err());
    }

    #[test]
    fn test_resource_binding_derives_path() {
        let binding = ArgBinding::Resource("src".into());
        let attrs = binding.bind(&json!({"id": "abc", "filename": "x.mp4", "loop": true})).unwrap();

        assert_eq!(attrs["src"], json!("/assets/abc"));
        assert_eq!(attrs["loop"], json!(true));
        assert!(binding.bind(&json!("abc")).is_err());
    }

    #[test]
    fn test_upsert_command_replaces_by_name() {
        let mut commands = mark_commands("bold", "Bold");
        upsert_command(
            &mut commands,
            CommandSpec::new("toggleBold", CommandKind::InsertText),
        );

        assert_eq!(commands.len(), 3);
        assert_eq!(commands[2].kind, CommandKind::InsertText);
    }
}
