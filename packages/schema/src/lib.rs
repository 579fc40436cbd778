//! # Folio Schema
//!
//! Turns type definitions contributed by extensions into one composite
//! [`Schema`], and reads and writes documents against it.
//!
//! ```text
//! BaseSchema ─┐
//! fragments  ─┴─▶ SchemaBuilder ──▶ Schema ──▶ DomParser     (markup → Node)
//!                                         └─▶ DomSerializer (Node → markup)
//! ```
//!
//! Definitions are data: attribute descriptors, parse rules, a render
//! function and the commands a type contributes. Customizing a type means
//! deriving a new definition from an existing one and registering it under
//! the same name; the later definition replaces the earlier one.

pub mod attribute;
pub mod base;
pub mod builder;
pub mod command;
pub mod content;
pub mod definition;
pub mod dom;
pub mod dom_parser;
pub mod dom_serializer;
pub mod error;
pub mod feature;
pub mod fragment;
pub mod schema;

pub use attribute::{AttrSource, AttrTarget, AttributeSpec, ValueKind};
pub use base::BaseSchema;
pub use builder::{build, SchemaBuilder};
pub use command::{ArgBinding, CommandKind, CommandSpec, DetailsTypes, TableTypes};
pub use content::{parse_content, ContentExpr, ContentModel};
pub use definition::{DefinitionDelta, GlobalAttributes, MarkSpec, NodeSpec, TypeDefinition, TypeRole};
pub use dom::{DomSpec, ParseRule, RenderSpec};
pub use dom_parser::{parse_document, DomParser};
pub use dom_serializer::{serialize_document, DomSerializer};
pub use error::{SchemaError, SchemaResult};
pub use feature::{Feature, FocusMode};
pub use fragment::SchemaFragment;
pub use schema::{CommandEntry, MarkType, NodeType, Schema, SchemaSummary};
