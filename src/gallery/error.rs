use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GalleryError {
    #[error("Photo not in sequence: {0}")]
    UnknownPhoto(String),

    #[error("Photo sequence is empty")]
    EmptySequence,

    #[error("Duplicate photo key: {0}")]
    DuplicateKey(String),
}
