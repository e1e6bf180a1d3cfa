use crate::storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PhotosError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl PhotosError {
    pub fn is_configuration(&self) -> bool {
        matches!(self, PhotosError::Storage(StorageError::Configuration(_)))
    }
}
