//! # Folio Markup
//!
//! The HTML-like markup layer documents are read from and written to.
//!
//! ```text
//! source text ──tokenizer──▶ tokens ──parser──▶ Vec<MarkupNode> ──serializer──▶ source text
//! ```
//!
//! Parsing is lenient in the way browsers are: unclosed elements are closed at
//! the end of input and stray closing tags are dropped. The tree carries no
//! knowledge of any document schema; interpretation happens in `folio-schema`.

pub mod ast;
pub mod error;
pub mod parser;
pub mod serializer;
pub mod tokenizer;

pub use ast::{is_void_element, merge_attributes, parse_style, Attributes, Element, MarkupNode};
pub use error::{MarkupError, MarkupResult};
pub use parser::{parse, Parser};
pub use serializer::{escape_attribute, escape_text, serialize, Serializer};
pub use tokenizer::{decode_entities, tokenize, ContentToken, TagToken};
