use folio_markup::MarkupError;
use thiserror::Error;

pub type SchemaResult<T> = Result<T, SchemaError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    /// Two definitions claim the same structural role and the override rule
    /// cannot decide between them
    #[error("Schema conflict: {message}")]
    Conflict { message: String },

    #[error("Invalid content expression `{expression}` on `{type_name}`: {message}")]
    InvalidContent {
        type_name: String,
        expression: String,
        message: String,
    },

    #[error("Schema has no top node")]
    MissingTopNode,

    #[error("Unknown node or mark type: {0}")]
    UnknownType(String),

    #[error("Invalid document at {path:?}: {message}")]
    InvalidDocument { path: Vec<usize>, message: String },

    #[error("Markup error: {0}")]
    Markup(#[from] MarkupError),
}

impl SchemaError {
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn invalid_content(
        type_name: impl Into<String>,
        expression: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidContent {
            type_name: type_name.into(),
            expression: expression.into(),
            message: message.into(),
        }
    }

    pub fn invalid_document(path: &[usize], message: impl Into<String>) -> Self {
        Self::InvalidDocument {
            path: path.to_vec(),
            message: message.into(),
        }
    }
}
