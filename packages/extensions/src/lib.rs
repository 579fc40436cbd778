//! # Folio Extensions
//!
//! Every editor capability beyond the base schema is an extension: a named
//! descriptor with configuration options and a loader that produces a
//! [`SchemaFragment`](folio_schema::SchemaFragment). The [`Registry`] picks
//! the active subset, loads it with one shared [`ExtensionConfig`] and hands
//! the fragments to the schema builder.
//!
//! ```text
//! config.extensions ─▶ Registry::ordered ─▶ loaders (immediate | deferred)
//!                                                    │
//!                             BaseSchema + fragments ─▶ Schema
//! ```

pub mod builtin;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod registry;
pub mod requests;

pub use config::{ExtensionConfig, EXTENSIONS_KEY};
pub use descriptor::{
    ExtensionDescriptor, ExtensionGroup, ExtensionSummary, LoadFuture, Loader, OptionField, OptionKind,
    DEFAULT_PRIORITY,
};
pub use error::{RegistryError, RegistryResult};
pub use registry::Registry;
pub use requests::{LinkKind, LinkRequest, VideoRequest, LINK_KINDS};
