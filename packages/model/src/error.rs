use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Resource reference has no id")]
    MissingResourceId,

    #[error("Resource reference is not an object")]
    NotAnObject,

    #[error("No node at path {0:?}")]
    InvalidPath(Vec<usize>),

    #[error("Offset {offset} is outside node at {path:?} (size {size})")]
    OffsetOutOfRange {
        path: Vec<usize>,
        offset: usize,
        size: usize,
    },
}
