//! Helpers over the inline content of a textblock.
//!
//! Offsets count characters of text leaves and 1 for every inline atom.

use crate::mark::{same_mark_set, Mark};
use crate::node::Node;

/// Merge adjacent text leaves with equal mark sets and drop empty ones
pub fn normalize_inline(content: Vec<Node>) -> Vec<Node> {
    let mut result: Vec<Node> = Vec::with_capacity(content.len());
    for node in content {
        if node.text.as_deref() == Some("") {
            continue;
        }
        if let (Some(last), Some(text)) = (result.last_mut(), node.text.as_deref()) {
            if last.is_text() && same_mark_set(&last.marks, &node.marks) {
                if let Some(existing) = last.text.as_mut() {
                    existing.push_str(text);
                    continue;
                }
            }
        }
        result.push(node);
    }
    result
}

/// Split inline content at `offset`. Text leaves straddling the offset are
/// cut in two; atoms are never cut.
pub fn split_inline(content: &[Node], offset: usize) -> (Vec<Node>, Vec<Node>) {
    let mut before = Vec::new();
    let mut after = Vec::new();
    let mut pos = 0;

    for node in content {
        let len = node.inline_len();
        if pos + len <= offset {
            before.push(node.clone());
        } else if pos >= offset {
            after.push(node.clone());
        } else if let Some(text) = &node.text {
            let cut = offset - pos;
            let head: String = text.chars().take(cut).collect();
            let tail: String = text.chars().skip(cut).collect();
            before.push(Node::text_with_marks(head, node.marks.clone()));
            after.push(Node::text_with_marks(tail, node.marks.clone()));
        } else {
            after.push(node.clone());
        }
        pos += len;
    }

    (normalize_inline(before), normalize_inline(after))
}

/// Split inline content into the parts before, inside and after `from..to`
pub fn slice_inline(content: &[Node], from: usize, to: usize) -> (Vec<Node>, Vec<Node>, Vec<Node>) {
    let (before, rest) = split_inline(content, from);
    let (middle, after) = split_inline(&rest, to.saturating_sub(from));
    (before, middle, after)
}

/// Apply `f` to every inline leaf inside `from..to` and return the
/// normalized result.
pub fn map_inline_range<F>(content: &[Node], from: usize, to: usize, mut f: F) -> Vec<Node>
where
    F: FnMut(&mut Node),
{
    let (before, mut middle, after) = slice_inline(content, from, to);
    for node in &mut middle {
        f(node);
    }
    let mut result = before;
    result.extend(middle);
    result.extend(after);
    normalize_inline(result)
}

/// Insert `text` carrying `marks` at `offset`
pub fn insert_text(content: &[Node], offset: usize, text: &str, marks: Vec<Mark>) -> Vec<Node> {
    insert_inline(content, offset, vec![Node::text_with_marks(text, marks)])
}

/// Insert inline nodes at `offset`
pub fn insert_inline(content: &[Node], offset: usize, nodes: Vec<Node>) -> Vec<Node> {
    let (mut result, after) = split_inline(content, offset);
    result.extend(nodes);
    result.extend(after);
    normalize_inline(result)
}

/// Remove the inline range `from..to`
pub fn delete_inline(content: &[Node], from: usize, to: usize) -> Vec<Node> {
    let (mut before, _, after) = slice_inline(content, from, to);
    before.extend(after);
    normalize_inline(before)
}

/// Marks a cursor at `offset` would pick up: the marks of the leaf ending
/// at the offset, or of the leaf starting there when the cursor is at the
/// start of the block.
pub fn marks_at(content: &[Node], offset: usize) -> Vec<Mark> {
    let mut pos = 0;
    for node in content {
        let len = node.inline_len();
        if (offset > pos && offset <= pos + len) || (offset == 0 && pos == 0) {
            return node.marks.clone();
        }
        pos += len;
    }
    Vec::new()
}

/// Inline leaves overlapping `from..to`. An empty range matches the leaf
/// the cursor sits in.
pub fn leaves_in_range(content: &[Node], from: usize, to: usize) -> Vec<&Node> {
    let mut pos = 0;
    let mut leaves = Vec::new();
    for node in content {
        let len = node.inline_len();
        let end = pos + len;
        let hit = if from == to {
            (from > pos && from <= end) || (from == 0 && pos == 0)
        } else {
            pos < to && end > from
        };
        if hit {
            leaves.push(node);
        }
        pos = end;
    }
    leaves
}

/// Extent of the contiguous run of leaves around `offset` carrying a mark of
/// type `kind`
pub fn mark_range(content: &[Node], offset: usize, kind: &str) -> Option<(usize, usize)> {
    let mut spans = Vec::new();
    let mut pos = 0;
    for node in content {
        let len = node.inline_len();
        spans.push((pos, pos + len, node.marks.iter().any(|m| m.kind == kind)));
        pos += len;
    }

    let index = spans
        .iter()
        .position(|(start, end, marked)| *marked && offset >= *start && offset <= *end)?;
    let mut start = spans[index].0;
    let mut end = spans[index].1;
    for (s, e, marked) in spans[..index].iter().rev() {
        if !marked || *e != start {
            break;
        }
        start = *s;
    }
    for (s, e, marked) in &spans[index + 1..] {
        if !marked || *s != end {
            break;
        }
        end = *e;
    }
    Some((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bold() -> Mark {
        Mark::new("bold")
    }

    #[test]
    fn test_normalize_merges_equal_marks() {
        let content = vec![
            Node::text("ab"),
            Node::text("cd"),
            Node::text(""),
            Node::text_with_marks("ef", vec![bold()]),
        ];
        let normalized = normalize_inline(content);

        assert_eq!(normalized.len(), 2);
        assert_eq!(normalized[0].text.as_deref(), Some("abcd"));
    }

    #[test]
    fn test_split_inside_text() {
        let content = vec![Node::text("hello"), Node::new("hardBreak"), Node::text("x")];
        let (before, after) = split_inline(&content, 2);

        assert_eq!(before, vec![Node::text("he")]);
        assert_eq!(after[0], Node::text("llo"));
        assert_eq!(after.len(), 3);
    }

    #[test]
    fn test_map_range_applies_marks() {
        let content = vec![Node::text("hello world")];
        let mapped = map_inline_range(&content, 0, 5, |n| n.marks.push(bold()));

        assert_eq!(mapped.len(), 2);
        assert_eq!(mapped[0].marks, vec![bold()]);
        assert_eq!(mapped[1].text.as_deref(), Some(" world"));
    }

    #[test]
    fn test_mark_range_spans_adjacent_leaves() {
        let link = Mark::new("link").with_attr("href", "/a");
        let content = vec![
            Node::text("go "),
            Node::text_with_marks("to", vec![link.clone()]),
            Node::text_with_marks(" here", vec![link, bold()]),
            Node::text(" now"),
        ];

        assert_eq!(mark_range(&content, 4, "link"), Some((3, 10)));
        assert_eq!(mark_range(&content, 1, "link"), None);
    }

    #[test]
    fn test_marks_at_cursor() {
        let content = vec![Node::text_with_marks("ab", vec![bold()]), Node::text("cd")];

        assert_eq!(marks_at(&content, 2), vec![bold()]);
        assert!(marks_at(&content, 3).is_empty());
        assert_eq!(marks_at(&content, 0), vec![bold()]);
    }
}
