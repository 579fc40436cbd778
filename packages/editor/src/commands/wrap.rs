//! Wrapping blocks in containers and lifting them back out.

use super::{applied, carry_attrs, fits, map_selection, not_applicable, relocate, Draft, Failure, Handled};
use crate::context::{block_range, child_path, lift_range, nearest, nearest_where, BlockRange};
use crate::transform::split_path;
use folio_model::{Attrs, Node, Selection};
use folio_schema::{DetailsTypes, Schema, SchemaError};

pub fn toggle_wrap(draft: &mut Draft, node_type: &str) -> Handled {
    if let Some(path) = nearest(draft.doc(), &draft.selection, node_type) {
        return lift_out(draft, &path);
    }
    let wrapped = wrap_range(
        draft,
        |schema, blocks| schema.node(node_type, &Attrs::new(), blocks.to_vec()),
        |k| vec![k],
    )?;
    match wrapped {
        Some(_) => applied(),
        None => not_applicable(),
    }
}

/// Replace the node at `path` with its children
fn lift_out(draft: &mut Draft, path: &[usize]) -> Handled {
    let schema = draft.schema();
    let (parent, index) = split_path(path)?;
    let node = draft.tr.node(path)?.clone();
    if !fits(schema, draft.tr.node(parent)?, index, index + 1, &node.content) {
        return not_applicable();
    }

    draft.tr.replace_with(path, node.content.clone())?;
    draft.selection = map_selection(schema, draft.doc(), &draft.selection, path, |p| {
        relocate(p, parent, index, 1, node.content.len(), |relative| {
            let (inner, rest) = relative.get(1..)?.split_first()?;
            let mut out = vec![index + inner];
            out.extend_from_slice(rest);
            Some(out)
        })
    });
    applied()
}

/// Wrap the selected sibling blocks in the node `build` makes of them,
/// moving up a level at a time until some parent accepts the wrapper.
/// `place` gives where the k-th wrapped block sits inside the wrapper.
/// Returns the path of the wrapper.
fn wrap_range<F, P>(draft: &mut Draft, build: F, place: P) -> Result<Option<Vec<usize>>, Failure>
where
    F: Fn(&Schema, &[Node]) -> Result<Node, SchemaError>,
    P: Fn(usize) -> Vec<usize>,
{
    let schema = draft.schema();
    let Some(mut range) = block_range(draft.doc(), &draft.selection) else {
        return Ok(None);
    };

    loop {
        let parent_node = draft.tr.node(&range.parent)?;
        let Some(blocks) = parent_node.content.get(range.from..range.to) else {
            return Ok(None);
        };
        let wrapper = build(schema, blocks)?;
        if valid_subtree(schema, &wrapper) && fits(schema, parent_node, range.from, range.to, std::slice::from_ref(&wrapper)) {
            draft.tr.replace(&range.parent, range.from, range.to, vec![wrapper])?;
            let BlockRange { parent, from, to } = range;
            draft.selection = map_selection(schema, draft.doc(), &draft.selection, &child_path(&parent, from), |p| {
                relocate(p, &parent, from, to - from, 1, |relative| {
                    let mut out = vec![from];
                    out.extend(place(relative[0] - from));
                    out.extend_from_slice(&relative[1..]);
                    Some(out)
                })
            });
            return Ok(Some(child_path(&parent, from)));
        }
        match lift_range(&range) {
            Some(next) => range = next,
            None => return Ok(None),
        }
    }
}

/// Content of the wrapper and of any freshly built children matches
fn valid_subtree(schema: &Schema, node: &Node) -> bool {
    schema.content_matches(&node.kind, &node.content)
        && node
            .content
            .iter()
            .filter(|child| !child.is_text() && !schema.is_textblock(&child.kind))
            .all(|child| schema.content_matches(&child.kind, &child.content))
}

/// Wrap in `list_type`, lift out of it when already inside one, or switch
/// the enclosing list to `list_type`
pub fn toggle_list(draft: &mut Draft, list_type: &str, item_type: &str) -> Handled {
    let schema = draft.schema();
    let lists = schema.group_members("list");
    let found = nearest_where(draft.doc(), &draft.selection, |node| lists.contains(&node.kind));

    match found {
        Some(path) if draft.doc().node_at(&path).is_some_and(|list| list.kind == list_type) => unwrap_list(draft, &path),
        Some(path) => retype_list(draft, &path, list_type),
        None => {
            let wrapped = wrap_range(
                draft,
                |schema, blocks| {
                    let items = blocks
                        .iter()
                        .map(|block| schema.node(item_type, &Attrs::new(), vec![block.clone()]))
                        .collect::<Result<Vec<_>, _>>()?;
                    schema.node(list_type, &Attrs::new(), items)
                },
                |k| vec![k, 0],
            )?;
            match wrapped {
                Some(_) => applied(),
                None => not_applicable(),
            }
        }
    }
}

/// Replace the list with the blocks of its items
fn unwrap_list(draft: &mut Draft, path: &[usize]) -> Handled {
    let schema = draft.schema();
    let (parent, index) = split_path(path)?;
    let list = draft.tr.node(path)?.clone();
    let blocks: Vec<Node> = list.content.iter().flat_map(|item| item.content.clone()).collect();
    if !fits(schema, draft.tr.node(parent)?, index, index + 1, &blocks) {
        return not_applicable();
    }

    let offsets: Vec<usize> = list
        .content
        .iter()
        .scan(0, |acc, item| {
            let start = *acc;
            *acc += item.content.len();
            Some(start)
        })
        .collect();
    draft.tr.replace_with(path, blocks.clone())?;
    draft.selection = map_selection(schema, draft.doc(), &draft.selection, path, |p| {
        relocate(p, parent, index, 1, blocks.len(), |relative| {
            let item = *relative.get(1)?;
            let child = *relative.get(2)?;
            let mut out = vec![index + offsets.get(item)? + child];
            out.extend_from_slice(&relative[3..]);
            Some(out)
        })
    });
    applied()
}

fn retype_list(draft: &mut Draft, path: &[usize], list_type: &str) -> Handled {
    let schema = draft.schema();
    let (parent, index) = split_path(path)?;
    let list = draft.tr.node(path)?;
    let replacement = schema.node(list_type, &carry_attrs(schema, list, list_type), list.content.clone())?;
    if !schema.content_matches(list_type, &replacement.content)
        || !fits(schema, draft.tr.node(parent)?, index, index + 1, std::slice::from_ref(&replacement))
    {
        return not_applicable();
    }
    draft.tr.replace_node(path, replacement)?;
    applied()
}

/// Wrap the selected blocks in a details node with an empty summary and
/// put the cursor in the summary
pub fn set_details(draft: &mut Draft, types: &DetailsTypes) -> Handled {
    let schema = draft.schema();
    let wrapped = wrap_range(
        draft,
        |schema, blocks| {
            let summary = schema.node(&types.summary, &Attrs::new(), Vec::new())?;
            let content = schema.node(&types.content, &Attrs::new(), blocks.to_vec())?;
            schema.node(&types.details, &Attrs::new(), vec![summary, content])
        },
        |k| vec![1, k],
    )?;
    match wrapped {
        Some(path) => {
            draft.selection = Selection::cursor(child_path(&path, 0), 0);
            if draft.selection.validate(draft.doc()).is_err() {
                draft.selection = crate::context::selection_near(schema, draft.doc(), &path);
            }
            applied()
        }
        None => not_applicable(),
    }
}

/// Replace the details node with its content blocks. A non-empty summary
/// is kept as a leading default textblock; an empty one is dropped.
pub fn unset_details(draft: &mut Draft, types: &DetailsTypes) -> Handled {
    let schema = draft.schema();
    let Some(path) = nearest(draft.doc(), &draft.selection, &types.details) else {
        return not_applicable();
    };
    let (parent, index) = split_path(&path)?;
    let details = draft.tr.node(&path)?.clone();

    let summary_index = details.content.iter().position(|child| child.kind == types.summary);
    let content_index = details.content.iter().position(|child| child.kind == types.content);
    let summary = summary_index
        .and_then(|i| details.content.get(i))
        .filter(|summary| !summary.content.is_empty());

    let mut blocks = Vec::new();
    if let (Some(summary), Some(textblock)) = (summary, schema.default_textblock()) {
        blocks.push(schema.node(textblock, &Attrs::new(), summary.content.clone())?);
    }
    let shift = blocks.len();
    if let Some(content) = content_index.and_then(|i| details.content.get(i)) {
        blocks.extend(content.content.iter().cloned());
    }
    if !fits(schema, draft.tr.node(parent)?, index, index + 1, &blocks) {
        return not_applicable();
    }

    draft.tr.replace_with(&path, blocks.clone())?;
    draft.tr.fill(parent)?;
    draft.selection = map_selection(schema, draft.doc(), &draft.selection, &path, |p| {
        relocate(p, parent, index, 1, blocks.len(), |relative| {
            let child = *relative.get(1)?;
            if Some(child) == content_index {
                let block = *relative.get(2)?;
                let mut out = vec![index + shift + block];
                out.extend_from_slice(&relative[3..]);
                Some(out)
            } else if Some(child) == summary_index && shift > 0 {
                let mut out = vec![index];
                out.extend_from_slice(&relative[2..]);
                Some(out)
            } else {
                None
            }
        })
    });
    applied()
}

/// `open` is the build-time flag of the details node; when set the toggle
/// always unsets
pub fn toggle_details(draft: &mut Draft, types: &DetailsTypes, open: bool) -> Handled {
    if open || nearest(draft.doc(), &draft.selection, &types.details).is_some() {
        unset_details(draft, types)
    } else {
        set_details(draft, types)
    }
}
