//! Reading a selection against a document: ancestors, covered textblocks,
//! sibling block ranges, and where to put the selection after an edit.

use folio_model::{Node, Position, Selection};
use folio_schema::Schema;

/// A run of sibling blocks `from..to` under `parent`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockRange {
    pub parent: Vec<usize>,
    pub from: usize,
    pub to: usize,
}

impl BlockRange {
    pub fn paths(&self) -> impl Iterator<Item = Vec<usize>> + '_ {
        (self.from..self.to).map(|index| child_path(&self.parent, index))
    }

    pub fn len(&self) -> usize {
        self.to - self.from
    }

    pub fn is_empty(&self) -> bool {
        self.from == self.to
    }
}

pub fn child_path(parent: &[usize], index: usize) -> Vec<usize> {
    let mut path = parent.to_vec();
    path.push(index);
    path
}

/// Paths of the selection's ancestors, innermost first. A node selection
/// counts as its own innermost ancestor.
pub fn ancestor_paths(doc: &Node, selection: &Selection) -> Vec<Vec<usize>> {
    selection
        .ancestor_paths()
        .into_iter()
        .filter(|path| doc.node_at(path).is_some())
        .collect()
}

/// Nearest ancestor of the given type
pub fn nearest(doc: &Node, selection: &Selection, type_name: &str) -> Option<Vec<usize>> {
    nearest_where(doc, selection, |node| node.kind == type_name)
}

pub fn nearest_where<F>(doc: &Node, selection: &Selection, mut predicate: F) -> Option<Vec<usize>>
where
    F: FnMut(&Node) -> bool,
{
    ancestor_paths(doc, selection)
        .into_iter()
        .find(|path| doc.node_at(path).is_some_and(&mut predicate))
}

/// Depth of the nearest ancestor of the type, counted from the innermost
pub fn ancestor_depth(doc: &Node, selection: &Selection, type_name: &str) -> Option<usize> {
    ancestor_paths(doc, selection)
        .iter()
        .position(|path| doc.node_at(path).is_some_and(|node| node.kind == type_name))
}

/// Textblocks touched by the selection, in document order
pub fn textblocks(schema: &Schema, doc: &Node, selection: &Selection) -> Vec<Vec<usize>> {
    let all = doc.find_all(|node| schema.is_textblock(&node.kind));
    match selection {
        Selection::All => all,
        Selection::Node { path } => all.into_iter().filter(|p| p.starts_with(path)).collect(),
        Selection::Text { .. } => {
            let Some((from, to)) = selection.text_range() else {
                return Vec::new();
            };
            all.into_iter()
                .filter(|p| (p.as_slice() >= from.path.as_slice() || from.path.starts_with(p)))
                .filter(|p| p.as_slice() <= to.path.as_slice() || p.starts_with(&to.path))
                .collect()
        }
    }
}

/// Inline offsets of the selection inside the textblock at `path`
pub fn inline_range(doc: &Node, selection: &Selection, path: &[usize]) -> (usize, usize) {
    let size = doc.node_at(path).map_or(0, Node::content_len);
    match selection.text_range() {
        Some((from, to)) => {
            let start = if from.path == path { from.offset.min(size) } else { 0 };
            let end = if to.path == path { to.offset.min(size) } else { size };
            (start, end.max(start))
        }
        None => (0, size),
    }
}

/// The textblock holding an empty text cursor, with its offset
pub fn cursor(doc: &Node, schema: &Schema, selection: &Selection) -> Option<(Vec<usize>, usize)> {
    if !selection.is_empty() {
        return None;
    }
    let (from, _) = selection.text_range()?;
    let node = doc.node_at(&from.path)?;
    schema
        .is_textblock(&node.kind)
        .then(|| (from.path.clone(), from.offset))
}

/// The sibling blocks the selection covers, taken at the deepest level
/// where both ends share a parent
pub fn block_range(doc: &Node, selection: &Selection) -> Option<BlockRange> {
    match selection {
        Selection::All => Some(BlockRange {
            parent: Vec::new(),
            from: 0,
            to: doc.content.len(),
        }),
        Selection::Node { path } => {
            let (index, parent) = path.split_last()?;
            Some(BlockRange {
                parent: parent.to_vec(),
                from: *index,
                to: index + 1,
            })
        }
        Selection::Text { .. } => {
            let (from, to) = selection.text_range()?;
            let shared = from
                .path
                .iter()
                .zip(&to.path)
                .take_while(|(a, b)| a == b)
                .count();
            if from.path == to.path {
                let (index, parent) = from.path.split_last()?;
                return Some(BlockRange {
                    parent: parent.to_vec(),
                    from: *index,
                    to: index + 1,
                });
            }
            let depth = shared.min(from.path.len().saturating_sub(1)).min(to.path.len().saturating_sub(1));
            Some(BlockRange {
                parent: from.path[..depth].to_vec(),
                from: from.path[depth],
                to: to.path[depth] + 1,
            })
        }
    }
}

/// The same range expressed one level up: the single ancestor block that
/// contains it
pub fn lift_range(range: &BlockRange) -> Option<BlockRange> {
    let (index, parent) = range.parent.split_last()?;
    Some(BlockRange {
        parent: parent.to_vec(),
        from: *index,
        to: index + 1,
    })
}

/// A selection at or after `path`: the start of the first textblock there,
/// else a selectable atom, else the last textblock before it
pub fn selection_near(schema: &Schema, doc: &Node, path: &[usize]) -> Selection {
    let candidates = doc.find_all(|node| {
        schema.is_textblock(&node.kind)
            || schema
                .node_type(&node.kind)
                .is_some_and(|t| t.is_atom() && t.spec.selectable && !t.is_inline())
    });

    let after = candidates
        .iter()
        .find(|p| p.as_slice() >= path || path.starts_with(p));
    let before = candidates.iter().rev().find(|p| p.as_slice() < path);
    match after.or(before) {
        Some(found) => {
            let node = doc.node_at(found);
            if node.is_some_and(|n| schema.is_textblock(&n.kind)) {
                Selection::cursor(found.clone(), 0)
            } else {
                Selection::node(found.clone())
            }
        }
        None => Selection::All,
    }
}

/// Cursor at the end of the textblock at `path`
pub fn cursor_at_end(doc: &Node, path: &[usize]) -> Selection {
    let offset = doc.node_at(path).map_or(0, Node::content_len);
    Selection::Text {
        anchor: Position::new(path.to_vec(), offset),
        head: Position::new(path.to_vec(), offset),
    }
}
