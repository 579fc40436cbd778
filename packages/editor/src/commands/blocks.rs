//! Inserting, removing and retyping blocks.

use super::{applied, carry_attrs, fits, not_applicable, not_found, Call, Draft, Failure, Handled};
use crate::context::{child_path, nearest, selection_near, textblocks};
use crate::transform::split_path;
use folio_model::inline::{delete_inline, insert_text, split_inline};
use folio_model::{Attrs, Node, Selection};
use folio_schema::{ArgBinding, Schema};

/// Where a new block goes: `(parent, from, to)` of the children it replaces
type Slot = (Vec<usize>, usize, usize);

/// Put `node` at the selection. An empty textblock at the cursor is
/// replaced; otherwise the node goes right after the selected block, or
/// after the nearest ancestor whose parent accepts it.
pub(crate) fn insert_block(draft: &mut Draft, node: Node) -> Result<Option<Vec<usize>>, Failure> {
    let schema = draft.schema();
    let Some((parent, from, to)) = block_slot(schema, draft.doc(), &draft.selection, &node) else {
        return Ok(None);
    };
    draft.tr.replace(&parent, from, to, vec![node])?;
    Ok(Some(child_path(&parent, from)))
}

fn block_slot(schema: &Schema, doc: &Node, selection: &Selection, node: &Node) -> Option<Slot> {
    let anchor = match selection {
        Selection::All => vec![doc.content.len().checked_sub(1)?],
        Selection::Node { path } => path.clone(),
        Selection::Text { .. } => selection.text_range()?.1.path.clone(),
    };
    if anchor.is_empty() {
        let size = doc.content.len();
        return fits(schema, doc, size, size, std::slice::from_ref(node)).then(|| (Vec::new(), size, size));
    }

    let current = doc.node_at(&anchor)?;
    if schema.is_textblock(&current.kind) && current.content.is_empty() {
        let (index, parent) = anchor.split_last()?;
        let parent_node = doc.node_at(parent)?;
        if fits(schema, parent_node, *index, index + 1, std::slice::from_ref(node)) {
            return Some((parent.to_vec(), *index, index + 1));
        }
    }

    let mut path = anchor.as_slice();
    while let Some((index, parent)) = path.split_last() {
        let parent_node = doc.node_at(parent)?;
        if fits(schema, parent_node, index + 1, index + 1, std::slice::from_ref(node)) {
            return Some((parent.to_vec(), index + 1, index + 1));
        }
        path = parent;
    }
    None
}

/// Textblock and offsets of a selection that stays inside one textblock
pub(crate) fn inline_target(schema: &Schema, doc: &Node, selection: &Selection) -> Option<(Vec<usize>, usize, usize)> {
    let (from, to) = selection.text_range()?;
    if from.path != to.path {
        return None;
    }
    let block = doc.node_at(&from.path)?;
    if !schema.is_textblock(&block.kind) {
        return None;
    }
    let size = block.content_len();
    Some((from.path.clone(), from.offset.min(size), to.offset.min(size)))
}

/// Replace the selected inline range with `node`; returns the path of the
/// inserted node
fn place_inline(draft: &mut Draft, node: Node) -> Result<Option<Vec<usize>>, Failure> {
    let schema = draft.schema();
    let Some((path, from, to)) = inline_target(schema, draft.doc(), &draft.selection) else {
        return Ok(None);
    };
    let block = draft.tr.node(&path)?;
    let accepts = schema
        .node_type(&block.kind)
        .is_some_and(|block_type| block_type.content.allows(&node.kind));
    if !accepts {
        return Ok(None);
    }

    let remaining = delete_inline(&block.content, from, to);
    let (mut content, after) = split_inline(&remaining, from);
    let index = content.len();
    content.push(node);
    content.extend(after);
    draft.tr.set_content(&path, content)?;
    Ok(Some(child_path(&path, index)))
}

pub fn insert_node(call: &Call, draft: &mut Draft, node_type: &str, binding: &ArgBinding) -> Handled {
    let schema = draft.schema();
    let attrs = call.bind(binding)?;
    let node = schema.create_and_fill(node_type, &attrs)?;

    if schema.is_inline(node_type) {
        return match place_inline(draft, node)? {
            Some(path) => {
                let offset = path.last().map_or(0, |index| inline_offset(draft.doc(), &path, *index));
                draft.selection = Selection::cursor(path[..path.len() - 1].to_vec(), offset + 1);
                applied()
            }
            None => not_applicable(),
        };
    }

    match insert_block(draft, node)? {
        Some(path) => {
            draft.selection = selection_after_insert(schema, draft.doc(), &path);
            applied()
        }
        None => not_applicable(),
    }
}

pub fn insert_inline(draft: &mut Draft, node_type: &str) -> Handled {
    let node = draft.schema().create_and_fill(node_type, &Attrs::new())?;
    match place_inline(draft, node)? {
        Some(path) => {
            let index = path.last().copied().unwrap_or_default();
            let offset = inline_offset(draft.doc(), &path, index);
            draft.selection = Selection::cursor(path[..path.len() - 1].to_vec(), offset + 1);
            applied()
        }
        None => not_applicable(),
    }
}

/// Inline offset where child `index` of the parent of `path` starts
fn inline_offset(doc: &Node, path: &[usize], index: usize) -> usize {
    doc.node_at(&path[..path.len().saturating_sub(1)])
        .map_or(0, |parent| parent.content.iter().take(index).map(Node::inline_len).sum())
}

/// A textblock takes the cursor; anything else goes through
/// [`selection_near`], which lands in its first textblock or selects the
/// atom itself
fn selection_after_insert(schema: &Schema, doc: &Node, path: &[usize]) -> Selection {
    match doc.node_at(path) {
        Some(node) if schema.is_textblock(&node.kind) => Selection::cursor(path.to_vec(), 0),
        _ => selection_near(schema, doc, path),
    }
}

/// A selected node of the type is updated in place; otherwise a new one is
/// inserted and selected
pub fn upsert(call: &Call, draft: &mut Draft, node_type: &str, binding: &ArgBinding) -> Handled {
    let attrs = call.bind(binding)?;

    if let Selection::Node { path } = &draft.selection {
        if draft.doc().node_at(path).is_some_and(|node| node.kind == node_type) {
            let path = path.clone();
            draft.tr.update_attrs(&path, &attrs)?;
            return applied();
        }
    }

    let schema = draft.schema();
    let node = schema.create_and_fill(node_type, &attrs)?;
    let inserted = if schema.is_inline(node_type) {
        place_inline(draft, node)?
    } else {
        insert_block(draft, node)?
    };
    match inserted {
        Some(path) => {
            draft.selection = Selection::node(path);
            applied()
        }
        None => not_applicable(),
    }
}

/// Delete the nearest enclosing node of the type and refill its parent
pub fn remove_ancestor(draft: &mut Draft, node_type: &str) -> Handled {
    let Some(path) = nearest(draft.doc(), &draft.selection, node_type) else {
        return not_found();
    };
    let (parent, _) = split_path(&path)?;
    let parent = parent.to_vec();

    draft.tr.remove(&path)?;
    draft.tr.fill(&parent)?;
    draft.selection = selection_near(draft.schema(), draft.doc(), &path);
    applied()
}

pub fn set_block_type(call: &Call, draft: &mut Draft, node_type: &str, binding: &ArgBinding) -> Handled {
    let attrs = call.bind(binding)?;
    if retype_textblocks(draft, node_type, &attrs)? {
        applied()
    } else {
        not_applicable()
    }
}

/// Set the type, or go back to `fallback` when every selected textblock
/// already has the type and the requested attributes
pub fn toggle_block_type(call: &Call, draft: &mut Draft, node_type: &str, fallback: &str, binding: &ArgBinding) -> Handled {
    let attrs = call.bind(binding)?;
    let schema = draft.schema();
    let doc = draft.doc();
    let blocks = textblocks(schema, doc, &draft.selection);
    let active = !blocks.is_empty()
        && blocks.iter().all(|path| {
            doc.node_at(path).is_some_and(|node| {
                node.kind == node_type && attrs.iter().all(|(key, value)| node.attr(key) == Some(value))
            })
        });

    let changed = if active {
        retype_textblocks(draft, fallback, &Attrs::new())?
    } else {
        retype_textblocks(draft, node_type, &attrs)?
    };
    if changed {
        applied()
    } else {
        not_applicable()
    }
}

/// Turn every selected textblock whose parent accepts it into `node_type`.
/// Returns whether any block could be retyped.
fn retype_textblocks(draft: &mut Draft, node_type: &str, attrs: &Attrs) -> Result<bool, Failure> {
    let schema = draft.schema();
    let Some(target) = schema.node_type(node_type) else {
        return Ok(false);
    };
    let code = target.spec.code;

    let mut any = false;
    for path in textblocks(schema, draft.doc(), &draft.selection) {
        let (parent, index) = split_path(&path)?;
        let node = draft.tr.node(&path)?;
        let mut merged = carry_attrs(schema, node, node_type);
        merged.extend(attrs.iter().map(|(k, v)| (k.clone(), v.clone())));

        let content = if code {
            node.content
                .iter()
                .filter(|child| child.is_text())
                .map(|child| Node::text(child.text.clone().unwrap_or_default()))
                .collect()
        } else {
            node.content.clone()
        };
        let replacement = schema.node(node_type, &merged, content)?;
        if !schema.content_matches(node_type, &replacement.content) {
            continue;
        }
        let parent_node = draft.tr.node(parent)?;
        if !fits(schema, parent_node, index, index + 1, std::slice::from_ref(&replacement)) {
            continue;
        }
        draft.tr.replace_node(&path, replacement)?;
        any = true;
    }
    Ok(any)
}

/// Split the textblock at the selection. At the end of a non-default block
/// the new block is the default textblock; inside a code block a newline is
/// inserted instead.
pub fn split_block(draft: &mut Draft) -> Handled {
    let schema = draft.schema();
    let Some((path, from, to)) = inline_target(schema, draft.doc(), &draft.selection) else {
        return not_applicable();
    };
    let (parent, index) = split_path(&path)?;
    let parent = parent.to_vec();
    let block = draft.tr.node(&path)?.clone();
    let Some(block_type) = schema.node_type(&block.kind) else {
        return not_applicable();
    };

    let remaining = delete_inline(&block.content, from, to);
    if block_type.spec.code {
        let content = insert_text(&remaining, from, "\n", Vec::new());
        draft.tr.set_content(&path, content)?;
        draft.selection = Selection::cursor(path, from + 1);
        return applied();
    }

    let (head, tail) = split_inline(&remaining, from);
    let at_end = tail.is_empty();
    let new_kind = match schema.default_textblock() {
        Some(default) if at_end && default != block.kind => default.to_string(),
        _ => block.kind.clone(),
    };
    let kept: Attrs = block_type
        .definition
        .attributes
        .iter()
        .filter(|spec| spec.keep_on_split && new_kind == block.kind)
        .filter_map(|spec| block.attrs.get(&spec.key).map(|value| (spec.key.clone(), value.clone())))
        .collect();

    let first = Node::new(block.kind.clone()).with_attrs(block.attrs.clone()).with_content(head);
    let second = schema.node(&new_kind, &kept, tail)?;
    let parent_node = draft.tr.node(&parent)?;
    let pair = [first, second];
    if !fits(schema, parent_node, index, index + 1, &pair) {
        return not_applicable();
    }

    draft.tr.replace(&parent, index, index + 1, pair.to_vec())?;
    draft.selection = Selection::cursor(child_path(&parent, index + 1), 0);
    applied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_schema::{build, BaseSchema};

    #[test]
    fn test_slot_replaces_empty_paragraph() {
        let schema = build(&[], &BaseSchema::standard()).unwrap();
        let doc = Node::new("doc").with_content(vec![
            Node::new("paragraph").with_child(Node::text("a")),
            Node::new("paragraph"),
        ]);
        let rule = Node::new("horizontalRule");

        assert_eq!(
            block_slot(&schema, &doc, &Selection::cursor(vec![1], 0), &rule),
            Some((vec![], 1, 2))
        );
        assert_eq!(
            block_slot(&schema, &doc, &Selection::cursor(vec![0], 1), &rule),
            Some((vec![], 1, 1))
        );
    }

    #[test]
    fn test_slot_climbs_out_of_list_items() {
        let schema = build(&[], &BaseSchema::standard()).unwrap();
        let doc = Node::new("doc").with_child(
            Node::new("bulletList").with_child(
                Node::new("listItem").with_child(Node::new("paragraph").with_child(Node::text("x"))),
            ),
        );
        let rule = Node::new("horizontalRule");

        // a list item takes blocks after its paragraph
        assert_eq!(
            block_slot(&schema, &doc, &Selection::cursor(vec![0, 0, 0], 1), &rule),
            Some((vec![0, 0], 1, 1))
        );
        // a list item cannot go inside a list item, only inside the list
        let item = Node::new("listItem").with_child(Node::new("paragraph"));
        assert_eq!(
            block_slot(&schema, &doc, &Selection::cursor(vec![0, 0, 0], 1), &item),
            Some((vec![0], 1, 1))
        );
    }
}
