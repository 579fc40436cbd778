//! Mark commands. A non-empty selection edits the marks of the text it
//! covers; an empty cursor edits the stored marks the next typed text
//! picks up.

use super::{applied, not_applicable, Call, Draft, Failure, Handled};
use crate::context::{cursor, inline_range, textblocks};
use folio_model::inline::{leaves_in_range, map_inline_range, mark_range, marks_at};
use folio_model::{find_mark, Mark, Position, Selection};
use folio_schema::attribute::fill_defaults;
use folio_schema::{ArgBinding, SchemaError};
use serde_json::Value;

type InlineRange = (Vec<usize>, usize, usize);

/// Covered inline ranges in textblocks that allow marks
fn covered(draft: &Draft) -> Vec<InlineRange> {
    let schema = draft.schema();
    let doc = draft.doc();
    textblocks(schema, doc, &draft.selection)
        .into_iter()
        .filter(|path| doc.node_at(path).is_some_and(|block| schema.allows_marks(&block.kind)))
        .map(|path| {
            let (from, to) = inline_range(doc, &draft.selection, &path);
            (path, from, to)
        })
        .filter(|(_, from, to)| from < to)
        .collect()
}

/// Extent of `mark` around an empty cursor
fn range_at_cursor(draft: &Draft, mark: &str) -> Option<InlineRange> {
    let (path, offset) = cursor(draft.doc(), draft.schema(), &draft.selection)?;
    let block = draft.doc().node_at(&path)?;
    let (from, to) = mark_range(&block.content, offset, mark)?;
    Some((path, from, to))
}

/// Marks the next inserted text would get
fn cursor_marks(draft: &Draft) -> Option<Vec<Mark>> {
    let (path, offset) = cursor(draft.doc(), draft.schema(), &draft.selection)?;
    let block = draft.doc().node_at(&path)?;
    if !draft.schema().allows_marks(&block.kind) {
        return None;
    }
    Some(
        draft
            .stored_marks
            .clone()
            .unwrap_or_else(|| marks_at(&block.content, offset)),
    )
}

fn map_ranges<F>(draft: &mut Draft, ranges: Vec<InlineRange>, f: &F) -> Result<(), Failure>
where
    F: Fn(&mut Vec<Mark>),
{
    for (path, from, to) in ranges {
        let block = draft.tr.node(&path)?;
        let content = map_inline_range(&block.content, from, to, |leaf| f(&mut leaf.marks));
        if content != block.content {
            draft.tr.set_content(&path, content)?;
        }
    }
    Ok(())
}

/// Apply `f` to the covered text, or to the stored marks at an empty cursor
fn edit_marks<F>(draft: &mut Draft, f: F) -> Handled
where
    F: Fn(&mut Vec<Mark>),
{
    if draft.selection.is_empty() {
        let Some(mut marks) = cursor_marks(draft) else {
            return not_applicable();
        };
        f(&mut marks);
        draft.stored_marks = Some(marks);
        return applied();
    }

    let ranges = covered(draft);
    if ranges.is_empty() {
        return not_applicable();
    }
    map_ranges(draft, ranges, &f)?;
    applied()
}

fn mark_attrs(draft: &Draft, mark: &str) -> Result<Vec<folio_schema::AttributeSpec>, Failure> {
    let mark_type = draft
        .schema()
        .mark_type(mark)
        .ok_or_else(|| SchemaError::UnknownType(mark.to_string()))?;
    Ok(mark_type.definition.attributes.clone())
}

fn all_null(mark: &Mark) -> bool {
    mark.attrs.values().all(Value::is_null)
}

pub fn set_mark(call: &Call, draft: &mut Draft, mark: &str, binding: &ArgBinding, extend_empty: bool) -> Handled {
    let schema = draft.schema();
    let attrs = call.bind(binding)?;
    let new_mark = schema.mark(mark, &attrs)?;
    let add = |marks: &mut Vec<Mark>| *marks = schema.add_mark(marks, new_mark.clone());

    if extend_empty && draft.selection.is_empty() {
        if let Some(range) = range_at_cursor(draft, mark) {
            map_ranges(draft, vec![range], &add)?;
            return applied();
        }
    }
    edit_marks(draft, add)
}

pub fn unset_mark(draft: &mut Draft, mark: &str, extend_empty: bool) -> Handled {
    let remove = |marks: &mut Vec<Mark>| marks.retain(|m| m.kind != mark);

    if extend_empty && draft.selection.is_empty() {
        if let Some(range) = range_at_cursor(draft, mark) {
            map_ranges(draft, vec![range], &remove)?;
            return applied();
        }
    }
    edit_marks(draft, remove)
}

/// Every covered text leaf carries the mark, or the cursor marks include it
fn is_active(draft: &Draft, mark: &str) -> bool {
    if draft.selection.is_empty() {
        return cursor_marks(draft).is_some_and(|marks| find_mark(&marks, mark).is_some());
    }
    let ranges = covered(draft);
    !ranges.is_empty()
        && ranges.iter().all(|(path, from, to)| {
            draft.doc().node_at(path).is_some_and(|block| {
                leaves_in_range(&block.content, *from, *to)
                    .iter()
                    .filter(|leaf| leaf.is_text())
                    .all(|leaf| find_mark(&leaf.marks, mark).is_some())
            })
        })
}

pub fn toggle_mark(call: &Call, draft: &mut Draft, mark: &str, binding: &ArgBinding) -> Handled {
    if is_active(draft, mark) {
        unset_mark(draft, mark, false)
    } else {
        set_mark(call, draft, mark, binding, false)
    }
}

/// Set `key` on the mark, adding the mark where it is missing
pub fn set_mark_attribute(call: &Call, draft: &mut Draft, mark: &str, key: &str) -> Handled {
    let schema = draft.schema();
    let specs = mark_attrs(draft, mark)?;
    let bound = call.bind(&ArgBinding::Value(key.to_string()))?;
    let value = bound.get(key).cloned().unwrap_or(Value::Null);

    edit_marks(draft, |marks| {
        let mut attrs = find_mark(marks, mark).map(|m| m.attrs.clone()).unwrap_or_default();
        attrs.insert(key.to_string(), value.clone());
        let updated = Mark::new(mark).with_attrs(fill_defaults(&specs, &attrs));
        *marks = schema.add_mark(marks, updated);
    })
}

/// Clear `key` on the mark and drop marks left with nothing set
pub fn unset_mark_attribute(draft: &mut Draft, mark: &str, key: &str) -> Handled {
    edit_marks(draft, |marks| {
        for existing in marks.iter_mut().filter(|m| m.kind == mark) {
            existing.attrs.insert(key.to_string(), Value::Null);
        }
        marks.retain(|m| m.kind != mark || !all_null(m));
    })
}

/// Drop marks of the type that carry no attribute values. Finding nothing
/// to drop still counts as applied.
pub fn remove_empty_mark(draft: &mut Draft, mark: &str) -> Handled {
    let clean = |marks: &mut Vec<Mark>| marks.retain(|m| m.kind != mark || !all_null(m));
    if draft.selection.is_empty() {
        if let Some(stored) = draft.stored_marks.as_mut() {
            clean(stored);
        }
        return applied();
    }
    let ranges = covered(draft);
    map_ranges(draft, ranges, &clean)?;
    applied()
}

/// Stretch the selection over the mark around its start. Takes the mark
/// name as a string or as `{"type": name}`.
pub fn extend_mark_range(call: &Call, draft: &mut Draft) -> Handled {
    let mark = match call.args {
        Value::String(name) => name.as_str(),
        Value::Object(object) => match object.get("type").and_then(Value::as_str) {
            Some(name) => name,
            None => return Err(Failure::Args("expected a mark name".to_string())),
        },
        _ => return Err(Failure::Args("expected a mark name".to_string())),
    };
    if draft.schema().mark_type(mark).is_none() {
        return Err(Failure::Args(format!("unknown mark `{}`", mark)));
    }

    let Some((start, _)) = draft.selection.text_range() else {
        return not_applicable();
    };
    let start = start.clone();
    let Some(block) = draft.doc().node_at(&start.path) else {
        return not_applicable();
    };
    let Some((from, to)) = mark_range(&block.content, start.offset, mark) else {
        return not_applicable();
    };

    draft.selection = Selection::range(Position::new(start.path.clone(), from), Position::new(start.path, to));
    applied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_null_mark() {
        assert!(all_null(&Mark::new("textStyle").with_attr("color", Value::Null)));
        assert!(!all_null(&Mark::new("textStyle").with_attr("color", "#f00")));
        assert!(all_null(&Mark::new("bold")));
    }

    #[test]
    fn test_mark_attrs_unknown_type() {
        let schema = folio_schema::build(&[], &folio_schema::BaseSchema::standard()).unwrap();
        let state = crate::state::EditorState::new(folio_model::Node::new("doc"), Selection::All);
        let draft = crate::commands::Draft::new(&schema, &state);

        assert!(mark_attrs(&draft, "bold").unwrap().is_empty());
        assert!(matches!(mark_attrs(&draft, "nope"), Err(Failure::Transform(_))));
    }
}
