use folio_schema::SchemaError;
use thiserror::Error;

pub type RegistryResult<T> = Result<T, RegistryError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error("Extension `{extension}` failed to load: {message}")]
    Load { extension: String, message: String },

    #[error("Configuration must be a JSON object, got {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl RegistryError {
    pub fn load(extension: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Load {
            extension: extension.into(),
            message: message.into(),
        }
    }
}
