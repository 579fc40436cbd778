//! Error types for the editor

use folio_model::ModelError;
use folio_schema::SchemaError;
use thiserror::Error;

pub type TransformResult<T> = Result<T, TransformError>;
pub type EditorResult<T> = Result<T, EditorError>;

/// A structural edit could not be carried out on the document tree
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    #[error("No node at path {0:?}")]
    NodeNotFound(Vec<usize>),

    #[error("Range {from}..{to} is outside the {size} children of {parent:?}")]
    RangeOutOfBounds {
        parent: Vec<usize>,
        from: usize,
        to: usize,
        size: usize,
    },

    #[error("The document root cannot be replaced")]
    RootReplacement,

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Contract violations of a command call. Unmet preconditions are not
/// errors; they come back as a rejected [`CommandOutcome`](crate::CommandOutcome).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommandError {
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Invalid arguments for `{command}`: {message}")]
    InvalidArguments { command: String, message: String },

    #[error("Command `{command}` failed: {source}")]
    Transform {
        command: String,
        #[source]
        source: TransformError,
    },
}

impl CommandError {
    pub fn invalid_arguments(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArguments {
            command: command.into(),
            message: message.into(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditorError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("Selection does not fit the document: {0}")]
    Selection(#[from] ModelError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    /// A command produced a document its schema rejects; nothing was committed
    #[error("Command `{command}` produced an invalid document: {source}")]
    InvalidResult {
        command: String,
        #[source]
        source: SchemaError,
    },

    #[error("Document JSON is malformed: {0}")]
    Json(String),
}

impl From<serde_json::Error> for EditorError {
    fn from(e: serde_json::Error) -> Self {
        EditorError::Json(e.to_string())
    }
}
