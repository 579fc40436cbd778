//! # Editor
//!
//! Owns one document, its selection and the schema it was built against.
//! Every command runs on a draft; the draft is committed only when it
//! applied, passed the post-command effects and still validates.

use crate::commands::{self, CommandOutcome, Execution};
use crate::context::selection_near;
use crate::effects::PostEffectEngine;
use crate::errors::{CommandError, EditorError, EditorResult};
use crate::queries::{self, CharacterCount};
use crate::state::EditorState;
use crate::steps::Step;
use folio_model::{Node, Selection};
use folio_schema::{parse_document, serialize_document, Feature, FocusMode, Schema};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

#[derive(Debug)]
pub struct Editor {
    schema: Arc<Schema>,
    state: EditorState,
    effects: PostEffectEngine,
    version: u64,
    history: Vec<Step>,
}

impl Editor {
    /// Start editing `doc`. It must validate against the schema; the
    /// post-command effects run once so it starts out consistent.
    pub fn new(schema: Arc<Schema>, doc: Node) -> EditorResult<Self> {
        schema.validate(&doc)?;
        let mut effects = PostEffectEngine::from_features(schema.features(), &doc);
        let mut doc = doc;
        let history = effects.apply(&mut doc)?;
        let selection = selection_near(&schema, &doc, &[]);

        debug!(fragments = schema.fragments().len(), "Editor created");
        Ok(Self {
            schema,
            state: EditorState::new(doc, selection),
            effects,
            version: 0,
            history,
        })
    }

    /// An editor over the smallest valid document
    pub fn empty(schema: Arc<Schema>) -> EditorResult<Self> {
        let doc = schema.create_and_fill(schema.top_node(), &Default::default())?;
        Self::new(schema, doc)
    }

    pub fn from_markup(schema: Arc<Schema>, source: &str) -> EditorResult<Self> {
        let doc = parse_document(&schema, source)?;
        Self::new(schema, doc)
    }

    pub fn from_json(schema: Arc<Schema>, json: &Value) -> EditorResult<Self> {
        let doc: Node = serde_json::from_value(json.clone())?;
        Self::new(schema, doc)
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn doc(&self) -> &Node {
        &self.state.doc
    }

    pub fn selection(&self) -> &Selection {
        &self.state.selection
    }

    /// Number of committed commands
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Every step committed so far, effects included
    pub fn history(&self) -> &[Step] {
        &self.history
    }

    /// Move the selection; stored marks do not survive a move
    pub fn set_selection(&mut self, selection: Selection) -> EditorResult<()> {
        selection.validate(&self.state.doc)?;
        self.state.selection = selection;
        self.state.stored_marks = None;
        Ok(())
    }

    /// Run a command. A rejection leaves everything as it was; a result the
    /// schema rejects is an error and is not committed either.
    #[instrument(skip(self, args), fields(version = self.version))]
    pub fn execute(&mut self, name: &str, args: &Value) -> EditorResult<CommandOutcome> {
        let Execution {
            outcome,
            owner,
            state,
            steps,
        } = commands::execute(&self.schema, &self.state, name, args)?;
        let Some(mut next) = state else {
            info!(command = name, ?outcome, "Command rejected");
            return Ok(outcome);
        };

        if let Some(rejection) = self.effects.check(&self.state.doc, &next.doc) {
            info!(command = name, ?rejection, "Command vetoed by editor feature");
            return Ok(CommandOutcome::Rejected(rejection));
        }
        let follow_up = self.effects.apply(&mut next.doc).map_err(|source| CommandError::Transform {
            command: name.to_string(),
            source,
        })?;

        if let Err(source) = self.schema.validate(&next.doc) {
            warn!(command = name, error = %source, "Command produced an invalid document");
            return Err(EditorError::InvalidResult {
                command: name.to_string(),
                source,
            });
        }
        if next.selection.validate(&next.doc).is_err() {
            next.selection = selection_near(&self.schema, &next.doc, next.selection.from_path());
        }

        self.history.extend(steps);
        self.history.extend(follow_up);
        self.state = next;
        self.version += 1;
        debug!(command = name, owner = ?owner, version = self.version, "Command committed");
        Ok(CommandOutcome::Applied)
    }

    /// Whether `name` would apply right now; nothing is committed
    pub fn can_execute(&self, name: &str, args: &Value) -> EditorResult<bool> {
        let execution = commands::execute(&self.schema, &self.state, name, args)?;
        Ok(match execution.state {
            Some(next) => self.effects.check(&self.state.doc, &next.doc).is_none(),
            None => false,
        })
    }

    pub fn to_html(&self) -> String {
        serialize_document(&self.schema, &self.state.doc)
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(&self.state.doc).unwrap_or(Value::Null)
    }

    /// Placeholder text while the document is empty
    pub fn placeholder(&self) -> Option<&str> {
        if !queries::is_empty_document(&self.schema, &self.state.doc) {
            return None;
        }
        self.schema.features().iter().find_map(|feature| match feature {
            Feature::Placeholder { text } => Some(text.as_str()),
            _ => None,
        })
    }

    /// Paths carrying the focus class, when the focus feature is on
    pub fn focused_paths(&self) -> Vec<Vec<usize>> {
        let mode = self.schema.features().iter().find_map(|feature| match feature {
            Feature::Focus { mode, .. } => Some(*mode),
            _ => None,
        });
        match mode {
            Some(mode) => queries::focused_paths(&self.state.doc, &self.state.selection, mode),
            None => Vec::new(),
        }
    }

    /// Focus paths for an explicit mode, regardless of configuration
    pub fn focused_paths_with(&self, mode: FocusMode) -> Vec<Vec<usize>> {
        queries::focused_paths(&self.state.doc, &self.state.selection, mode)
    }

    pub fn character_count(&self) -> CharacterCount {
        queries::character_count(&self.state.doc)
    }

    /// The configured character limit, if any
    pub fn character_limit(&self) -> Option<usize> {
        self.schema.features().iter().find_map(|feature| match feature {
            Feature::CharacterCount { limit } => *limit,
            _ => None,
        })
    }
}
