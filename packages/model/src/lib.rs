//! # Folio Model
//!
//! The in-memory document: typed [`Node`] trees with attribute maps, inline
//! [`Mark`]s, host supplied [`Selection`]s and [`ResourceRef`] bindings to
//! external assets. Nothing here knows about a schema; validity against a
//! content model is checked by `folio-schema`.

pub mod error;
pub mod inline;
pub mod mark;
pub mod node;
pub mod resource;
pub mod selection;

pub use error::ModelError;
pub use mark::{find_mark, same_mark_set, Mark};
pub use node::{Attrs, Node, TEXT_TYPE};
pub use resource::{asset_id, asset_path, ResourceRef, ASSET_PREFIX};
pub use selection::{Position, Selection};
