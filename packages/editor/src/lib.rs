//! # Folio Editor
//!
//! Executes schema commands against a document.
//!
//! ```text
//! Editor::execute("setLayout", 3)
//!        │
//!        ▼
//! commands::execute ── ranks the entries for the name, runs each on a
//!        │              Draft (Transform + selection) until one applies
//!        ▼
//! PostEffectEngine ─── character limit veto, unique id follow-up steps
//!        │
//!        ▼
//! Schema::validate ─── commit, bump version
//! ```
//!
//! Commands never leave a document half-edited: a rejection
//! ([`CommandOutcome::Rejected`]) means the state is untouched, and a
//! contract violation comes back as an [`EditorError`].
//!
//! ```rust,ignore
//! let mut editor = Editor::from_markup(schema, "<p>Hello</p>")?;
//! editor.execute("insertLayout", &json!(3))?;
//! assert_eq!(editor.doc().content[1].content.len(), 3);
//! ```

pub mod commands;
pub mod context;
pub mod editor;
pub mod effects;
pub mod errors;
pub mod ids;
pub mod queries;
pub mod state;
pub mod steps;
pub mod transform;
pub mod typography;

pub use commands::{execute, CommandOutcome, Execution, Rejection};
pub use editor::Editor;
pub use effects::{CharacterLimit, PostEffect, PostEffectEngine, UniqueIds};
pub use errors::{CommandError, EditorError, EditorResult, TransformError, TransformResult};
pub use ids::IdGenerator;
pub use queries::CharacterCount;
pub use state::EditorState;
pub use steps::Step;
pub use transform::Transform;
