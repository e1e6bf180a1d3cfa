use crate::storage::{ListPage, ObjectLister, StorageError};
use async_trait::async_trait;

/// Stands in for a real lister when credentials are missing. Never touches
/// the network.
pub struct UnconfiguredLister {
    error: StorageError,
}

impl UnconfiguredLister {
    pub fn new(error: StorageError) -> Self {
        Self { error }
    }
}

#[async_trait]
impl ObjectLister for UnconfiguredLister {
    async fn list_page(
        &self,
        _bucket: &str,
        _prefix: &str,
        _continuation_token: Option<String>,
    ) -> Result<ListPage, StorageError> {
        Err(self.error.clone())
    }

    fn name(&self) -> &str {
        "Unconfigured"
    }
}
