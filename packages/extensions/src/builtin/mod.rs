//! The built-in extension catalogue.

pub mod details;
pub mod editor;
pub mod layout;
pub mod marks;
pub mod media;
pub mod table;
pub mod text;

use crate::descriptor::ExtensionDescriptor;

/// Every built-in descriptor in catalogue order
pub fn extensions() -> Vec<ExtensionDescriptor> {
    vec![
        // marks
        marks::highlight(),
        marks::link(),
        marks::superscript(),
        marks::subscript(),
        marks::underline(),
        marks::text_style(),
        marks::color(),
        // nodes
        layout::layout(),
        layout::layout_column(),
        text::bullet_list(),
        text::ordered_list(),
        table::table(),
        text::paragraph(),
        text::heading(),
        media::image(),
        media::video(),
        layout::spacer(),
        text::text_align(),
        details::details(),
        details::details_content(),
        details::details_summary(),
        // editor
        editor::placeholder(),
        editor::focus(),
        editor::typography(),
        editor::character_count(),
        editor::unique_id(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_names_are_unique() {
        let all = extensions();
        let names: HashSet<_> = all.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names.len(), all.len());
        assert_eq!(all.len(), 26);
    }
}
