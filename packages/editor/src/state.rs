use folio_model::{Mark, Node, Selection};
use serde::{Deserialize, Serialize};

/// Document, selection and pending marks; everything a command reads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorState {
    pub doc: Node,
    pub selection: Selection,
    /// Marks the next inserted text gets, set by mark commands at an empty
    /// cursor. `None` means "whatever the text before the cursor carries".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stored_marks: Option<Vec<Mark>>,
}

impl EditorState {
    pub fn new(doc: Node, selection: Selection) -> Self {
        Self {
            doc,
            selection,
            stored_marks: None,
        }
    }
}
