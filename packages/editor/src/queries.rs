//! Read-only views the host asks for after each change.

use folio_model::{Node, Selection};
use folio_schema::{FocusMode, Schema};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CharacterCount {
    pub characters: usize,
    pub words: usize,
}

/// Characters of all text; words split on whitespace with block
/// boundaries counting as whitespace
pub fn character_count(doc: &Node) -> CharacterCount {
    let mut characters = 0;
    let mut flat = String::new();
    doc.walk(&mut |node: &Node, _: &[usize]| {
        match &node.text {
            Some(text) => {
                characters += text.chars().count();
                flat.push_str(text);
            }
            None => flat.push(' '),
        }
        true
    });
    CharacterCount {
        characters,
        words: flat.split_whitespace().count(),
    }
}

/// The document is a single empty textblock
pub fn is_empty_document(schema: &Schema, doc: &Node) -> bool {
    match doc.content.as_slice() {
        [] => true,
        [only] => schema.is_textblock(&only.kind) && only.content.is_empty(),
        _ => false,
    }
}

/// Paths of the nodes that take the focus class: the non-text ancestors of
/// the selection start below the root, outermost first
pub fn focused_paths(doc: &Node, selection: &Selection, mode: FocusMode) -> Vec<Vec<usize>> {
    let mut paths: Vec<Vec<usize>> = selection
        .ancestor_paths()
        .into_iter()
        .rev()
        .filter(|path| !path.is_empty())
        .filter(|path| doc.node_at(path).is_some_and(|node| !node.is_text()))
        .collect();

    match mode {
        FocusMode::All => paths,
        FocusMode::Shallowest => {
            paths.truncate(1);
            paths
        }
        FocusMode::Deepest => paths.pop().into_iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> Node {
        Node::new("doc").with_content(vec![
            Node::new("paragraph").with_child(Node::text("Hello big")),
            Node::new("blockquote").with_child(Node::new("paragraph").with_child(Node::text("world"))),
        ])
    }

    #[test]
    fn test_counts_cross_block_boundaries() {
        assert_eq!(
            character_count(&doc()),
            CharacterCount {
                characters: 14,
                words: 3
            }
        );
        assert_eq!(character_count(&Node::new("doc")), CharacterCount::default());
    }

    #[test]
    fn test_focus_modes() {
        let selection = Selection::cursor(vec![1, 0], 2);

        assert_eq!(focused_paths(&doc(), &selection, FocusMode::All), vec![vec![1], vec![1, 0]]);
        assert_eq!(focused_paths(&doc(), &selection, FocusMode::Deepest), vec![vec![1, 0]]);
        assert_eq!(focused_paths(&doc(), &selection, FocusMode::Shallowest), vec![vec![1]]);
        assert!(focused_paths(&doc(), &Selection::All, FocusMode::All).is_empty());
    }
}
