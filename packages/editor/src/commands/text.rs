use super::blocks::inline_target;
use super::{applied, not_applicable, Call, Draft, Failure, Handled};
use crate::typography;
use folio_model::inline::{delete_inline, insert_text as insert_inline_text, leaves_in_range, marks_at};
use folio_model::{Mark, Node, Selection};
use folio_schema::{Feature, Schema};
use serde_json::Value;

/// Replace the selection with text given as a string or `{"text": ...}`.
/// The text takes the stored marks when there are any, otherwise the marks
/// around the cursor.
pub fn insert_text(call: &Call, draft: &mut Draft) -> Handled {
    let text = match call.args {
        Value::String(text) => text.clone(),
        Value::Object(object) => match object.get("text").and_then(Value::as_str) {
            Some(text) => text.to_string(),
            None => return Err(Failure::Args("expected `text`".to_string())),
        },
        _ => return Err(Failure::Args("expected a string".to_string())),
    };

    let schema = draft.schema();
    let Some((path, from, to)) = inline_target(schema, draft.doc(), &draft.selection) else {
        return not_applicable();
    };
    let block = draft.tr.node(&path)?;
    let code = schema.node_type(&block.kind).is_some_and(|t| t.spec.code);
    let text = if !code && schema.features().contains(&Feature::Typography) {
        typography::apply(&text)
    } else {
        text
    };
    let remaining = delete_inline(&block.content, from, to);

    let marks = match (code, draft.stored_marks.take()) {
        (true, _) => Vec::new(),
        (false, Some(stored)) => stored,
        (false, None) => inherited_marks(schema, &remaining, from),
    };
    let content = insert_inline_text(&remaining, from, &text, marks);
    draft.tr.set_content(&path, content)?;
    draft.selection = Selection::cursor(path, from + text.chars().count());
    applied()
}

/// Marks before `offset`, without non-inclusive marks that end there
fn inherited_marks(schema: &Schema, content: &[Node], offset: usize) -> Vec<Mark> {
    let following: Vec<Mark> = leaves_in_range(content, offset, offset + 1)
        .first()
        .map(|leaf| leaf.marks.clone())
        .unwrap_or_default();
    marks_at(content, offset)
        .into_iter()
        .filter(|mark| {
            schema.mark_type(&mark.kind).map_or(true, |t| t.spec().inclusive) || following.contains(mark)
        })
        .collect()
}
