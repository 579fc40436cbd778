pub mod apply;
pub mod convert;
pub mod extensions;
pub mod init;
pub mod schema;

pub use apply::{apply, ApplyArgs};
pub use convert::{convert, ConvertArgs};
pub use extensions::{extensions, ExtensionsArgs};
pub use init::{init, InitArgs};
pub use schema::{schema, SchemaArgs};

use anyhow::{Context, Result};
use clap::ValueEnum;
use folio_editor::Editor;
use folio_schema::Schema;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Document representation on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Html,
    Json,
}

impl Format {
    /// `.json` files hold document JSON, anything else is markup
    pub fn of(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Format::Json,
            _ => Format::Html,
        }
    }
}

/// Open the document at `path` in an editor over `schema`
pub fn open(schema: Arc<Schema>, path: &Path) -> Result<Editor> {
    let content = fs::read_to_string(path).with_context(|| format!("Cannot read {}", path.display()))?;
    let editor = match Format::of(path) {
        Format::Json => {
            let json = serde_json::from_str(&content)?;
            Editor::from_json(schema, &json)
        }
        Format::Html => Editor::from_markup(schema, &content),
    }
    .with_context(|| format!("{} does not fit the schema", path.display()))?;
    Ok(editor)
}

pub fn render(editor: &Editor, format: Format) -> Result<String> {
    Ok(match format {
        Format::Html => editor.to_html(),
        Format::Json => serde_json::to_string_pretty(&editor.to_json())?,
    })
}

/// Print to stdout or write to `out`
pub fn emit(output: &str, out: Option<&Path>) -> Result<()> {
    match out {
        Some(path) => fs::write(path, output).with_context(|| format!("Cannot write {}", path.display())),
        None => {
            println!("{}", output);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(Format::of(Path::new("doc.json")), Format::Json);
        assert_eq!(Format::of(Path::new("doc.html")), Format::Html);
        assert_eq!(Format::of(Path::new("doc")), Format::Html);
    }
}
