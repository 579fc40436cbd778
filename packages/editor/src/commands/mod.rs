//! # Command execution
//!
//! A command name resolves to one or more table entries, one per type that
//! declares it. Entries are tried in order:
//!
//! 1. owners the selection is inside, innermost first
//! 2. entries that do not depend on ancestry (marks, fragment commands)
//! 3. owners the selection is not inside
//!
//! with later fragments first on ties. The first entry that applies wins;
//! when none does, the first rejection is reported.
//!
//! Every attempt runs on its own [`Draft`], so a rejected or failed command
//! leaves the state it was given untouched.

mod attrs;
mod blocks;
mod layout;
mod marks;
mod table;
mod text;
mod wrap;

use crate::context::ancestor_depth;
use crate::errors::{CommandError, TransformError};
use crate::state::EditorState;
use crate::steps::Step;
use crate::transform::Transform;
use folio_model::{Attrs, Mark, Node, Selection};
use folio_schema::{ArgBinding, CommandEntry, CommandKind, Schema, SchemaError};
use serde::Serialize;
use serde_json::Value;
use std::cmp::Reverse;
use tracing::debug;

/// Why a command did not apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Rejection {
    /// The selection is not inside the context the command needs
    NotApplicable,
    /// The node the command acts on does not exist
    NotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CommandOutcome {
    Applied,
    Rejected(Rejection),
}

impl CommandOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, CommandOutcome::Applied)
    }
}

/// Result of running a command against a state
#[derive(Debug, Clone)]
pub struct Execution {
    pub outcome: CommandOutcome,
    /// Type whose entry applied
    pub owner: Option<String>,
    /// The new state; `None` unless the command applied
    pub state: Option<EditorState>,
    pub steps: Vec<Step>,
}

/// Run `name` with `args` against `state`
pub fn execute(schema: &Schema, state: &EditorState, name: &str, args: &Value) -> Result<Execution, CommandError> {
    let entries = schema.commands(name);
    if entries.is_empty() {
        return Err(CommandError::UnknownCommand(name.to_string()));
    }

    let mut rejection = None;
    for entry in candidates(schema, &state.doc, &state.selection, entries) {
        let call = Call {
            owner: entry.owner.as_deref(),
            args,
        };
        let mut draft = Draft::new(schema, state);
        let outcome = run(&entry.spec.kind, &call, &mut draft).map_err(|failure| failure.into_error(name))?;

        match outcome {
            CommandOutcome::Applied => {
                debug!(
                    command = name,
                    owner = ?entry.owner,
                    steps = draft.tr.steps().len(),
                    "Command applied"
                );
                let (doc, steps) = draft.tr.into_parts();
                return Ok(Execution {
                    outcome,
                    owner: entry.owner.clone(),
                    state: Some(EditorState {
                        doc,
                        selection: draft.selection,
                        stored_marks: draft.stored_marks,
                    }),
                    steps,
                });
            }
            CommandOutcome::Rejected(reason) => {
                debug!(command = name, owner = ?entry.owner, ?reason, "Command entry rejected");
                rejection.get_or_insert(reason);
            }
        }
    }

    Ok(Execution {
        outcome: CommandOutcome::Rejected(rejection.unwrap_or(Rejection::NotApplicable)),
        owner: None,
        state: None,
        steps: Vec::new(),
    })
}

fn candidates<'s>(
    schema: &Schema,
    doc: &Node,
    selection: &Selection,
    entries: &'s [CommandEntry],
) -> Vec<&'s CommandEntry> {
    let mut ranked: Vec<((u8, usize, Reverse<usize>), &CommandEntry)> = entries
        .iter()
        .map(|entry| {
            let key = match entry.owner.as_deref() {
                Some(owner) if schema.node_type(owner).is_some() => match ancestor_depth(doc, selection, owner) {
                    Some(depth) => (0, depth, Reverse(entry.rank)),
                    None => (2, 0, Reverse(entry.rank)),
                },
                _ => (1, 0, Reverse(entry.rank)),
            };
            (key, entry)
        })
        .collect();
    ranked.sort_by_key(|(key, _)| *key);
    ranked.into_iter().map(|(_, entry)| entry).collect()
}

fn run(kind: &CommandKind, call: &Call, draft: &mut Draft) -> Handled {
    match kind {
        CommandKind::UpdateAttributes { binding } => attrs::update_attributes(call, draft, binding),
        CommandKind::SetGlobalAttribute { key, types, allowed } => {
            attrs::set_global_attribute(call, draft, key, types, allowed)
        }
        CommandKind::ResetGlobalAttribute { key, types } => attrs::reset_global_attribute(draft, key, types),

        CommandKind::InsertNode { node_type, binding } => blocks::insert_node(call, draft, node_type, binding),
        CommandKind::InsertInline { node_type } => blocks::insert_inline(draft, node_type),
        CommandKind::Upsert { node_type, binding } => blocks::upsert(call, draft, node_type, binding),
        CommandKind::RemoveAncestor { node_type } => blocks::remove_ancestor(draft, node_type),
        CommandKind::SetBlockType { node_type, binding } => blocks::set_block_type(call, draft, node_type, binding),
        CommandKind::ToggleBlockType {
            node_type,
            fallback,
            binding,
        } => blocks::toggle_block_type(call, draft, node_type, fallback, binding),
        CommandKind::SplitBlock => blocks::split_block(draft),

        CommandKind::ToggleWrap { node_type } => wrap::toggle_wrap(draft, node_type),
        CommandKind::ToggleList { list_type, item_type } => wrap::toggle_list(draft, list_type, item_type),
        CommandKind::SetDetails(types) => wrap::set_details(draft, types),
        CommandKind::UnsetDetails(types) => wrap::unset_details(draft, types),
        CommandKind::ToggleDetails { types, open } => wrap::toggle_details(draft, types, *open),

        CommandKind::InsertColumns {
            node_type,
            column_type,
            count_key,
            default_count,
        } => layout::insert_columns(call, draft, node_type, column_type, count_key, *default_count),
        CommandKind::ResizeColumns {
            node_type,
            column_type,
            count_key,
        } => layout::resize_columns(call, draft, node_type, column_type, count_key),

        CommandKind::InsertTable(types) => table::insert_table(call, draft, types),
        CommandKind::AddRowAfter(types) => table::add_row_after(draft, types),
        CommandKind::DeleteRow(types) => table::delete_row(draft, types),

        CommandKind::SetMark {
            mark,
            binding,
            extend_empty,
        } => marks::set_mark(call, draft, mark, binding, *extend_empty),
        CommandKind::UnsetMark { mark, extend_empty } => marks::unset_mark(draft, mark, *extend_empty),
        CommandKind::ToggleMark { mark, binding } => marks::toggle_mark(call, draft, mark, binding),
        CommandKind::SetMarkAttribute { mark, key } => marks::set_mark_attribute(call, draft, mark, key),
        CommandKind::UnsetMarkAttribute { mark, key } => marks::unset_mark_attribute(draft, mark, key),
        CommandKind::RemoveEmptyMark { mark } => marks::remove_empty_mark(draft, mark),
        CommandKind::ExtendMarkRange => marks::extend_mark_range(call, draft),

        CommandKind::InsertText => text::insert_text(call, draft),
    }
}

/// Arguments of one call plus the type whose entry is running
pub(crate) struct Call<'c> {
    pub owner: Option<&'c str>,
    pub args: &'c Value,
}

impl Call<'_> {
    pub fn bind(&self, binding: &ArgBinding) -> Result<Attrs, Failure> {
        binding.bind(self.args).map_err(Failure::Args)
    }
}

/// Working state of one attempt
pub(crate) struct Draft<'a> {
    pub tr: Transform<'a>,
    pub selection: Selection,
    pub stored_marks: Option<Vec<Mark>>,
}

impl<'a> Draft<'a> {
    fn new(schema: &'a Schema, state: &EditorState) -> Self {
        Self {
            tr: Transform::new(schema, state.doc.clone()),
            selection: state.selection.clone(),
            stored_marks: state.stored_marks.clone(),
        }
    }

    pub fn schema(&self) -> &'a Schema {
        self.tr.schema()
    }

    pub fn doc(&self) -> &Node {
        self.tr.doc()
    }
}

/// Why an attempt could not run at all
#[derive(Debug)]
pub(crate) enum Failure {
    Args(String),
    Transform(TransformError),
}

impl Failure {
    fn into_error(self, command: &str) -> CommandError {
        match self {
            Failure::Args(message) => CommandError::invalid_arguments(command, message),
            Failure::Transform(source) => CommandError::Transform {
                command: command.to_string(),
                source,
            },
        }
    }
}

impl From<TransformError> for Failure {
    fn from(e: TransformError) -> Self {
        Failure::Transform(e)
    }
}

impl From<SchemaError> for Failure {
    fn from(e: SchemaError) -> Self {
        Failure::Transform(TransformError::Schema(e))
    }
}

pub(crate) type Handled = Result<CommandOutcome, Failure>;

pub(crate) fn applied() -> Handled {
    Ok(CommandOutcome::Applied)
}

pub(crate) fn not_applicable() -> Handled {
    Ok(CommandOutcome::Rejected(Rejection::NotApplicable))
}

pub(crate) fn not_found() -> Handled {
    Ok(CommandOutcome::Rejected(Rejection::NotFound))
}

/// Children of `parent` with `from..to` swapped for `nodes` satisfy its
/// content model
pub(crate) fn fits(schema: &Schema, parent: &Node, from: usize, to: usize, nodes: &[Node]) -> bool {
    let mut children = parent.content.clone();
    children.splice(from..to, nodes.iter().cloned());
    schema.content_matches(&parent.kind, &children)
}

/// Attributes to carry over when a node changes type: keys the new type
/// declares, minus values that were only the old type's defaults
pub(crate) fn carry_attrs(schema: &Schema, node: &Node, new_type: &str) -> Attrs {
    let old = schema.node_type(&node.kind);
    let Some(new) = schema.node_type(new_type) else {
        return Attrs::new();
    };
    node.attrs
        .iter()
        .filter(|(key, _)| new.definition.attribute(key).is_some())
        .filter(|(key, value)| {
            !old.and_then(|t| t.definition.attribute(key))
                .is_some_and(|spec| spec.is_default(value))
        })
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Where `path` ends up after children `index..index + removed` of `parent`
/// were replaced by `inserted` new children. Paths inside the replaced run
/// go through `inner`, which sees them relative to `parent` and answers
/// relative to it too.
pub(crate) fn relocate<F>(path: &[usize], parent: &[usize], index: usize, removed: usize, inserted: usize, inner: F) -> Option<Vec<usize>>
where
    F: Fn(&[usize]) -> Option<Vec<usize>>,
{
    let depth = parent.len();
    if !path.starts_with(parent) || path.len() == depth {
        return Some(path.to_vec());
    }
    let child = path[depth];
    if child < index {
        return Some(path.to_vec());
    }
    let mut result = parent.to_vec();
    if child >= index + removed {
        result.push(child - removed + inserted);
        result.extend_from_slice(&path[depth + 1..]);
        return Some(result);
    }
    result.extend(inner(&path[depth..])?);
    Some(result)
}

/// Rewrite every path in the selection through `map`; positions whose path
/// has no image fall back to the start of `fallback`
pub(crate) fn map_selection<F>(schema: &Schema, doc: &Node, selection: &Selection, fallback: &[usize], map: F) -> Selection
where
    F: Fn(&[usize]) -> Option<Vec<usize>>,
{
    let mapped = match selection {
        Selection::Text { anchor, head } => match (map(&anchor.path), map(&head.path)) {
            (Some(anchor_path), Some(head_path)) => Some(Selection::Text {
                anchor: folio_model::Position::new(anchor_path, anchor.offset),
                head: folio_model::Position::new(head_path, head.offset),
            }),
            _ => None,
        },
        Selection::Node { path } => map(path).map(Selection::node),
        Selection::All => Some(Selection::All),
    };
    match mapped {
        Some(selection) if selection.validate(doc).is_ok() => selection,
        _ => crate::context::selection_near(schema, doc, fallback),
    }
}
